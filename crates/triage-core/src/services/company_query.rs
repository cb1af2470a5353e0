//! Filtering, ordering and ranking of company listings

use std::cmp::Ordering;
use triage_types::{Company, CompanyFilter, SortOrder};

/// True when the company satisfies every predicate set on the filter
pub fn matches(company: &Company, filter: &CompanyFilter) -> bool {
    if let Some(status) = filter.status {
        if company.status != status {
            return false;
        }
    }

    if let Some(industry) = &filter.industry {
        if company.industry.as_deref() != Some(industry.as_str()) {
            return false;
        }
    }

    if let Some(min_score) = filter.min_score {
        if company.score < min_score {
            return false;
        }
    }

    true
}

/// Order companies in place. Ties fall back to ascending id.
pub fn sort(companies: &mut [Company], order: SortOrder) {
    companies.sort_by(|a, b| compare(a, b, order).then_with(|| a.id.cmp(&b.id)));
}

fn compare(a: &Company, b: &Company, order: SortOrder) -> Ordering {
    match order {
        SortOrder::ScoreDesc => b.score.total_cmp(&a.score),
        SortOrder::ScoreAsc => a.score.total_cmp(&b.score),
        SortOrder::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortOrder::NameDesc => b.name.to_lowercase().cmp(&a.name.to_lowercase()),
    }
}

/// Apply the filter predicates and its ordering (score descending by default)
pub fn filter_companies<'a, I>(companies: I, filter: &CompanyFilter) -> Vec<Company>
where
    I: IntoIterator<Item = &'a Company>,
{
    let mut selected: Vec<Company> = companies
        .into_iter()
        .filter(|company| matches(company, filter))
        .cloned()
        .collect();

    sort(&mut selected, filter.sort_by.unwrap_or(SortOrder::ScoreDesc));
    selected
}

/// Highest scores first, at most `limit` entries
pub fn top_ranked<'a, I>(companies: I, limit: usize) -> Vec<Company>
where
    I: IntoIterator<Item = &'a Company>,
{
    let mut ranked: Vec<Company> = companies.into_iter().cloned().collect();
    sort(&mut ranked, SortOrder::ScoreDesc);
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use triage_types::{CompanyId, CompanyStatus};

    fn company(id: i64, name: &str, industry: &str, score: f64, status: CompanyStatus) -> Company {
        Company {
            id: CompanyId::new(id),
            name: name.to_string(),
            url: Some(format!("https://{}.example", id)),
            industry: Some(industry.to_string()),
            score,
            vacancy_count: 1,
            main_skills: Vec::new(),
            status,
            created_at: Some(Utc::now()),
            updated_at: None,
            vacancies: Vec::new(),
        }
    }

    fn sample() -> Vec<Company> {
        vec![
            company(1, "beta", "IT", 70.0, CompanyStatus::New),
            company(2, "Alpha", "IT", 90.0, CompanyStatus::Approved),
            company(3, "gamma", "Fintech", 90.0, CompanyStatus::New),
            company(4, "Delta", "IT", 40.0, CompanyStatus::Rejected),
        ]
    }

    fn ids(companies: &[Company]) -> Vec<i64> {
        companies.iter().map(|c| c.id.value()).collect()
    }

    #[test]
    fn test_filters_combine() {
        let companies = sample();
        let filter = CompanyFilter {
            industry: Some("IT".to_string()),
            min_score: Some(70.0),
            ..Default::default()
        };

        assert_eq!(ids(&filter_companies(&companies, &filter)), vec![2, 1]);

        let by_status = CompanyFilter {
            status: Some(CompanyStatus::New),
            ..Default::default()
        };
        assert_eq!(ids(&filter_companies(&companies, &by_status)), vec![3, 1]);
    }

    #[test]
    fn test_industry_match_is_exact() {
        let companies = sample();
        let filter = CompanyFilter {
            industry: Some("it".to_string()),
            ..Default::default()
        };
        assert!(filter_companies(&companies, &filter).is_empty());
    }

    #[test]
    fn test_sort_orders() {
        let mut companies = sample();

        sort(&mut companies, SortOrder::ScoreAsc);
        assert_eq!(ids(&companies), vec![4, 1, 2, 3]);

        sort(&mut companies, SortOrder::NameAsc);
        assert_eq!(ids(&companies), vec![2, 1, 4, 3]);

        sort(&mut companies, SortOrder::NameDesc);
        assert_eq!(ids(&companies), vec![3, 4, 1, 2]);
    }

    #[test]
    fn test_top_ranked_breaks_ties_by_id() {
        let companies = sample();
        let top = top_ranked(&companies, 3);
        assert_eq!(ids(&top), vec![2, 3, 1]);
    }

    #[test]
    fn test_top_ranked_caps_length() {
        let companies: Vec<Company> = (1..=25)
            .map(|id| company(id, "c", "IT", id as f64, CompanyStatus::New))
            .collect();

        let top = top_ranked(&companies, 20);
        assert_eq!(top.len(), 20);
        assert_eq!(top[0].id.value(), 25);
        assert!(top.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }
}
