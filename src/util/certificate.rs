use crate::config::InstitutionConfig;
use crate::model::bonafide_request::BonafideRequest;

/// The certified fields of an approved request, in the order they appear on
/// the printed document.
#[derive(Debug, Clone)]
pub struct CertificateData {
    pub student_name: String,
    pub roll_number: String,
    pub father_name: String,
    pub course: String,
    pub department: String,
    pub academic_year: String,
    pub date_of_birth: String,
    pub purpose: String,
    pub conduct: String,
    pub issue_date: String,
}

impl CertificateData {
    pub fn from_request(request: &BonafideRequest, issue_date: String) -> Self {
        CertificateData {
            student_name: request.student_name.clone(),
            roll_number: request.roll_number.clone(),
            father_name: request.father_name.clone(),
            course: request.course.clone(),
            department: request.department.clone(),
            academic_year: request.academic_year.clone(),
            date_of_birth: request.date_of_birth.clone(),
            purpose: request.purpose.clone(),
            conduct: request.conduct.clone(),
            issue_date,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    #[error("Failed to render certificate: {0}")]
    RenderFailed(String),
}

/// Seam for the document engine. The default renderer emits the fixed
/// plain-text layout; a PDF engine slots in behind the same trait.
pub trait CertificateRenderer: Send + Sync {
    fn render(
        &self,
        data: &CertificateData,
        institution: &InstitutionConfig,
    ) -> Result<Vec<u8>, CertificateError>;
}

/// Fixed-layout plain-text certificate: letterhead, centered title, the nine
/// certified lines, issue date and the institutional footer.
pub struct PlainTextCertificateRenderer;

impl CertificateRenderer for PlainTextCertificateRenderer {
    fn render(
        &self,
        data: &CertificateData,
        institution: &InstitutionConfig,
    ) -> Result<Vec<u8>, CertificateError> {
        let mut lines: Vec<String> = Vec::new();
        lines.push(institution.name.clone());
        lines.push(String::new());
        lines.push("BONAFIDE AND CONDUCT CERTIFICATE".to_string());
        lines.push(String::new());
        lines.push(format!(
            "This is to certify that Mr/Ms. {}, Bearing to Roll No: {},",
            data.student_name, data.roll_number
        ));
        lines.push(format!(
            "S/O or D/O of Shri {} is/was a student of this institution and studying in {},",
            data.father_name, data.course
        ));
        lines.push(format!(
            "Branch: {} during the year {}.",
            data.department, data.academic_year
        ));
        lines.push(format!(
            "His/Her Date of birth is: {}, Purpose: {}.",
            data.date_of_birth, data.purpose
        ));
        lines.push(format!(
            "His/Her Conduct and Character is/was: {}.",
            data.conduct
        ));
        lines.push(String::new());
        lines.push(format!("Date: {}", data.issue_date));
        lines.push(format!("Place: {}", institution.name));
        lines.push(String::new());
        lines.push(format!(
            "{}, {}, {}",
            institution.name, institution.address, institution.website
        ));

        Ok(lines.join("\n").into_bytes())
    }
}
