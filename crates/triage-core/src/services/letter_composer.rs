//! Template-based outreach letter composition

use crate::config::SenderConfig;
use serde::{Deserialize, Serialize};
use triage_types::{Company, LetterTemplate};

/// Subject and body of a freshly composed letter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedLetter {
    pub subject: String,
    pub body: String,
}

pub struct LetterComposer {
    sender: SenderConfig,
}

impl LetterComposer {
    pub fn new(sender: SenderConfig) -> Self {
        Self { sender }
    }

    /// Compose a draft for the company. Deterministic for equal inputs.
    pub fn compose(&self, company: &Company, template: LetterTemplate) -> ComposedLetter {
        match template {
            LetterTemplate::Formal => self.formal(company),
            LetterTemplate::Informal => self.informal(company),
        }
    }

    fn formal(&self, company: &Company) -> ComposedLetter {
        let subject = format!(
            "Partnership proposal for {} from {}",
            company.name, self.sender.organization
        );

        let body = format!(
            "Dear {name} team,\n\
            \n\
            We have been following your hiring activity: you currently have {vacancies}, \
            with a strong focus on {skills}.\n\
            \n\
            {org} trains specialists in exactly these areas. We would like to propose \
            a collaboration: internships for our students, guest lectures by your engineers \
            and training programmes tailored to your future hires.\n\
            \n\
            We would be glad to discuss the details at a time convenient for you.\n\
            \n\
            Kind regards,\n\
            {org}\n\
            {email}",
            name = company.name,
            vacancies = vacancy_phrase(company.vacancy_count),
            skills = skills_phrase(&company.main_skills),
            org = self.sender.organization,
            email = self.sender.contact_email,
        );

        ComposedLetter { subject, body }
    }

    fn informal(&self, company: &Company) -> ComposedLetter {
        let subject = format!("Let's team up, {}!", company.name);

        let body = format!(
            "Hi {name} team!\n\
            \n\
            We noticed you have {vacancies} and are looking for people who know {skills}. \
            Our students learn exactly that, so let's talk about internships and joint projects.\n\
            \n\
            Drop us a line at {email}.\n\
            \n\
            Cheers,\n\
            {org}",
            name = company.name,
            vacancies = vacancy_phrase(company.vacancy_count),
            skills = skills_phrase(&company.main_skills),
            org = self.sender.organization,
            email = self.sender.contact_email,
        );

        ComposedLetter { subject, body }
    }
}

fn vacancy_phrase(count: u32) -> String {
    match count {
        0 => "no open vacancies right now".to_string(),
        1 => "1 open vacancy".to_string(),
        n => format!("{} open vacancies", n),
    }
}

/// "A", "A and B", "A, B and C"
fn skills_phrase(skills: &[String]) -> String {
    match skills {
        [] => "your core technologies".to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use triage_types::{CompanyId, CompanyStatus};

    fn company(skills: &[&str], vacancy_count: u32) -> Company {
        Company {
            id: CompanyId::new(7),
            name: "Acme Robotics".to_string(),
            url: Some("https://acme.example".to_string()),
            industry: Some("IT".to_string()),
            score: 80.0,
            vacancy_count,
            main_skills: skills.iter().map(|s| s.to_string()).collect(),
            status: CompanyStatus::New,
            created_at: Some(Utc::now()),
            updated_at: None,
            vacancies: Vec::new(),
        }
    }

    #[test]
    fn test_formal_letter_mentions_company_and_sender() {
        let composer = LetterComposer::new(SenderConfig::default());
        let letter = composer.compose(&company(&["Rust", "Go", "SQL"], 4), LetterTemplate::Formal);

        assert_eq!(
            letter.subject,
            "Partnership proposal for Acme Robotics from Ural Federal University (UrFU)"
        );
        assert!(letter.body.starts_with("Dear Acme Robotics team,"));
        assert!(letter.body.contains("4 open vacancies"));
        assert!(letter.body.contains("Rust, Go and SQL"));
        assert!(letter.body.ends_with("procompetencies@urfu.ru"));
    }

    #[test]
    fn test_informal_letter() {
        let composer = LetterComposer::new(SenderConfig::default());
        let letter = composer.compose(&company(&["Kotlin"], 1), LetterTemplate::Informal);

        assert_eq!(letter.subject, "Let's team up, Acme Robotics!");
        assert!(letter.body.contains("1 open vacancy"));
        assert!(letter.body.contains("who know Kotlin."));
    }

    #[test]
    fn test_composition_is_deterministic() {
        let composer = LetterComposer::new(SenderConfig::default());
        let target = company(&[], 0);

        let first = composer.compose(&target, LetterTemplate::Formal);
        let second = composer.compose(&target, LetterTemplate::Formal);

        assert_eq!(first, second);
        assert!(first.body.contains("your core technologies"));
    }
}
