use anyhow::{Context, anyhow};
use clap::Parser;
use lightweight_lms_webapp::api::{LearnerBackend, WebappApi};
use lightweight_lms_webapp::cli::{Args, Command};
use lightweight_lms_webapp::errors::{ErrorKind, ViewError};
use lightweight_lms_webapp::lesson::{CompleteOutcome, LessonSession, Phase, Transition};
use lightweight_lms_webapp::outline::{self, ContinueAction};
use lightweight_lms_webapp::progress::{self, ProgressStats};
use lightweight_lms_webapp::session::AppSession;
use lightweight_lms_webapp::{certificates, media, quiz};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level)?;

    if let Command::Media { media_id } = args.command {
        let url = media::media_proxy_url(&args.media_base_url, media_id)
            .ok_or_else(|| anyhow!("Media id must be positive"))?;
        println!("{}", url);
        return Ok(());
    }

    let launch =
        lightweight_lms_webapp::init_launch(&args).map_err(|err| anyhow!(err.user_message()))?;
    let api = lightweight_lms_webapp::init_client(&args);

    info!("Starting learner session...");
    let mut session = AppSession::start(api.clone(), &launch)
        .await
        .map_err(surface)
        .context("Session failed to start")?;

    run(&mut session, api, args.command).await.map_err(surface)
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_new(log_level)?)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn surface(err: ViewError) -> anyhow::Error {
    let message = err.user_message();
    if err.offers_retry() {
        anyhow!("{} Run the command again to retry.", message)
    } else {
        anyhow!(message)
    }
}

async fn run(
    session: &mut AppSession<WebappApi>,
    api: WebappApi,
    command: Command,
) -> Result<(), ViewError> {
    match command {
        Command::Courses => print_courses(session),
        Command::Enroll { course_id } => {
            let enrollment = session.enroll(course_id).await?;
            println!("Enrolled into \"{}\"", enrollment.title);
            print_courses(session);
        }
        Command::Outline { course_id } => print_outline(&api, course_id).await?,
        Command::Next { course_id } => print_next_lesson(&api, course_id).await?,
        Command::Lesson {
            course_id,
            lesson_id,
        } => {
            let mut lesson = LessonSession::new(api, course_id, lesson_id);
            lesson.load().await?;
            print_lesson(&lesson);
        }
        Command::Complete {
            course_id,
            lesson_id,
        } => {
            let mut lesson = LessonSession::new(api, course_id, lesson_id);
            lesson.load().await?;
            match lesson.complete().await? {
                CompleteOutcome::Completed { completion, next } => {
                    println!("✅ Lesson completed!");
                    println!(
                        "{}",
                        progress::lesson_progress_label(
                            completion.completed_lessons,
                            completion.total_lessons
                        )
                    );
                    print_transition(next);
                }
                CompleteOutcome::AlreadyCompleted => println!("This lesson is already completed."),
            }
            print_course_progress(session, course_id).await;
        }
        Command::Quiz {
            course_id,
            lesson_id,
            answers,
        } => {
            let mut lesson = LessonSession::new(api, course_id, lesson_id);
            lesson.load().await?;
            if lesson.phase() == Phase::Summary {
                print_lesson(&lesson);
                return Ok(());
            }
            for (question, option) in answers.into_iter().enumerate() {
                lesson.select_answer(question, option)?;
            }
            let result = lesson.submit().await?;
            println!("Quiz Results");
            println!(
                "{}  {}",
                progress::score_label(result.score, result.total_score),
                progress::percent_label(result.percentage)
            );
            for outcome in &result.results {
                let mark = if outcome.correct { "✓" } else { "✗" };
                println!(
                    "  {} Question {} ({} pts)",
                    mark,
                    outcome.question_index + 1,
                    outcome.points
                );
            }
            if result.course_completed {
                println!("🎓 Course completed!");
            }
            print_course_progress(session, course_id).await;
        }
        Command::Retake {
            course_id,
            lesson_id,
        } => {
            let mut lesson = LessonSession::new(api, course_id, lesson_id);
            lesson.load().await?;
            let retake = lesson.retake().await?;
            println!("🔄 New attempt started (attempts used: {})", retake.attempts_used);
            print_lesson(&lesson);
        }
        Command::Watch {
            course_id,
            lesson_id,
        } => {
            let mut lesson = LessonSession::new(api, course_id, lesson_id);
            lesson.load().await?;
            println!("Sending video to chat...");
            let next = lesson.request_video().await?;
            print_transition(next);
        }
        Command::Progress => {
            session.refresh_courses().await?;
            print_progress(session);
        }
        Command::Certificates => {
            let list = api
                .get_certificates()
                .await
                .map_err(|err| ViewError::new(ErrorKind::Fetch, err))?;
            if list.is_empty() {
                println!("No certificates yet. Complete a course to earn one.");
            }
            for cert in certificates::sorted_by_completion(list) {
                println!(
                    "🏆 {} · {} ({})",
                    cert.course_title,
                    certificates::completed_on(&cert),
                    cert.certificate_code
                );
            }
        }
        // printed before the session starts
        Command::Media { .. } => {}
    }
    Ok(())
}

async fn print_course_progress(session: &mut AppSession<WebappApi>, course_id: i64) {
    match session.refresh_courses().await {
        Ok(()) => {
            if let Some(course) = session.course_progress(course_id) {
                println!(
                    "{}: {}",
                    course.title,
                    progress::lesson_progress_label(course.completed_lessons, course.total_lessons)
                );
            }
        }
        Err(err) => println!("Course progress could not be refreshed: {}", err.user_message()),
    }
}

fn print_transition(next: Transition) {
    match next {
        Transition::BackToCourse(course_id) => println!("→ Back to course {}", course_id),
        Transition::ExitApp => println!("→ The video is waiting for you in the chat."),
    }
}

fn print_courses(session: &AppSession<WebappApi>) {
    println!("Hello, {}!", session.student().display_name());
    println!("My Courses");
    if session.my_courses().is_empty() {
        println!("  You are not enrolled in any course yet.");
    }
    for course in session.my_courses() {
        println!(
            "  [{}] {}  {}",
            course.id,
            course.title,
            progress::lesson_progress_label(course.completed_lessons, course.total_lessons)
        );
    }
    if !session.available_courses().is_empty() {
        println!("Available Courses");
    }
    for course in session.available_courses() {
        let offer = if course.is_free() { "Enroll Free" } else { "Paid" };
        println!(
            "  [{}] {} ({} lessons) {}",
            course.id, course.title, course.total_lessons, offer
        );
    }
}

async fn print_outline(api: &WebappApi, course_id: i64) -> Result<(), ViewError> {
    let outline = api
        .get_course_outline(course_id)
        .await
        .map_err(|err| ViewError::new(ErrorKind::Fetch, err))?;
    outline::check_outline(&outline);

    println!("{}", outline.title);
    println!(
        "{}",
        progress::lesson_progress_label(outline.completed_lessons, outline.total_lessons)
    );
    if let Some(notice) = outline::enrollment_notice(outline.enrollment_status) {
        println!("{}", notice);
    }
    match outline::continue_action(&outline) {
        ContinueAction::Resume(lesson_id) => {
            if let Some(lesson) = outline::find_lesson(&outline, lesson_id) {
                println!("▶ Continue Learning: {}", lesson.title);
            }
        }
        ContinueAction::Review => println!("✓ Review Course"),
        _ => {}
    }

    for module in &outline.modules {
        println!("{} ({}%)", module.title, module.progress_percent);
        for lesson in &module.lessons {
            let current = if lesson.is_current { " ← current" } else { "" };
            let mut line = format!(
                "  [{}] {} · {}{}",
                lesson.id,
                lesson.title,
                lesson.status.label(),
                current
            );
            if lesson.is_quiz && lesson.status.is_completed() {
                if let Some(percent) = lesson.last_score_percent {
                    line.push_str(&format!(" · Score: {}%", percent));
                }
                if lesson.can_retake.unwrap_or(false) {
                    line.push_str(" • Can retake");
                }
            }
            println!("{}", line);
        }
    }
    Ok(())
}

async fn print_next_lesson(api: &WebappApi, course_id: i64) -> Result<(), ViewError> {
    let next = api
        .get_next_lesson(course_id)
        .await
        .map_err(|err| ViewError::new(ErrorKind::Fetch, err))?;
    let Some(lesson_id) = next.lesson_id else {
        println!("Nothing left to study in this course.");
        return Ok(());
    };
    match (next.locked.unwrap_or(false), next.unlock_date) {
        (true, Some(date)) => println!(
            "🔒 Lesson {} unlocks on {}",
            lesson_id,
            date.format("%B %-d, %Y")
        ),
        (true, None) => println!("🔒 Lesson {} is locked", lesson_id),
        (false, _) => println!("▶ Next lesson: {}", lesson_id),
    }
    Ok(())
}

fn print_lesson(lesson: &LessonSession<WebappApi>) {
    let Some(detail) = lesson.lesson() else {
        return;
    };
    println!("{}", detail.title);
    if detail.status.is_completed() {
        println!("✓ Completed");
    }
    if let Some(text) = detail.text.as_deref().or(detail.description.as_deref()) {
        println!("{}", text);
    }
    if let Some(url) = detail.playable_video_url() {
        println!("Video: {}", url);
    }
    for resource in detail.resources() {
        println!("  📎 {}: {}", resource.label, resource.url);
    }

    if let Some(summary) = lesson.summary() {
        println!("📊 Quiz Completed");
        if let Some(percent) = summary.last_score_percent {
            println!("Last score: {}", progress::percent_label(percent));
        }
        if let Some(attempts) = summary.attempts_label() {
            println!("{}", attempts);
        }
        match summary.retake.message() {
            Some(reason) => println!("❌ {}", reason),
            None => println!("🔄 Retake available"),
        }
    } else if let Some(form) = lesson.quiz() {
        for (index, question) in detail.questions().iter().enumerate() {
            println!("Question {} of {}", index + 1, form.question_count());
            println!("  {}", question.question);
            for (option_index, option) in question.options.iter().enumerate() {
                println!("    {}. {}", quiz::option_label(option_index), option);
            }
        }
    }

    let actions = lesson.actions();
    if actions.show_complete {
        println!("→ complete {} {}", lesson.course_id(), lesson.lesson_id());
    }
    if actions.show_watch_in_chat {
        println!(
            "Videos are played in Telegram chat → watch {} {}",
            lesson.course_id(),
            lesson.lesson_id()
        );
    }
}

fn print_progress(session: &AppSession<WebappApi>) {
    let stats = ProgressStats::from_courses(session.my_courses());
    println!("Overall progress: {}", progress::percent_label(stats.overall_percent));
    println!(
        "Courses: {} total, {} active, {} completed",
        stats.total_courses, stats.active_courses, stats.completed_courses
    );
    println!(
        "Lessons: {} / {} completed",
        stats.completed_lessons, stats.total_lessons
    );
    for course in session.my_courses() {
        println!(
            "  {}  {} / {} lessons ({}%)",
            course.title,
            course.completed_lessons,
            course.total_lessons,
            progress::course_percent(course)
        );
    }
}
