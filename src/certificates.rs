use crate::model::Certificate;

/// e.g. `October 19, 2026`
pub fn completed_on(certificate: &Certificate) -> String {
    certificate.completed_at.format("%B %-d, %Y").to_string()
}

/// Text copied to the clipboard when a certificate is shared.
pub fn share_text(certificate: &Certificate) -> String {
    format!(
        "🎓 I've completed \"{}\"!\n\nCertificate ID: {}",
        certificate.course_title, certificate.certificate_code
    )
}

/// Most recent first.
pub fn sorted_by_completion(mut certificates: Vec<Certificate>) -> Vec<Certificate> {
    certificates.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    certificates
}
