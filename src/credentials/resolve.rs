use crate::core::{GpError, Result};
use super::store::CredentialRecord;

/// Resolve a user-supplied identifier to a stored email.
///
/// Precedence: 1-based list position, then exact case-insensitive email, then
/// a unique case-insensitive substring. Several substring hits are an error
/// carrying every candidate.
pub fn resolve_identifier(records: &[CredentialRecord], query: &str) -> Result<String> {
    let query = query.trim();

    if let Ok(position) = query.parse::<usize>() {
        if (1..=records.len()).contains(&position) {
            return records[position - 1]
                .email()
                .map(str::to_string)
                .ok_or_else(|| GpError::NotFound(query.to_string()));
        }
    }

    let emails = records.iter().filter_map(CredentialRecord::email);

    let needle = query.to_lowercase();
    if let Some(exact) = emails.clone().find(|email| email.to_lowercase() == needle) {
        return Ok(exact.to_string());
    }

    let mut candidates: Vec<String> = emails
        .filter(|email| email.to_lowercase().contains(&needle))
        .map(str::to_string)
        .collect();

    match candidates.len() {
        0 => Err(GpError::NoMatch(query.to_string())),
        1 => Ok(candidates.remove(0)),
        _ => Err(GpError::AmbiguousMatch {
            query: query.to_string(),
            candidates,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(emails: &[&str]) -> Vec<CredentialRecord> {
        emails
            .iter()
            .map(|email| CredentialRecord::new(format!("Email={email}&Token=t")))
            .collect()
    }

    #[test]
    fn test_exact_match_beats_substring() {
        let records = records(&["ab@x.com", "a@x.com"]);
        assert_eq!(resolve_identifier(&records, "a@x.com").unwrap(), "a@x.com");
        assert_eq!(resolve_identifier(&records, "A@X.COM").unwrap(), "a@x.com");
    }

    #[test]
    fn test_ambiguous_lists_all_candidates() {
        let records = records(&["alice@x.com", "alicia@x.com", "bob@x.com"]);
        match resolve_identifier(&records, "ali") {
            Err(GpError::AmbiguousMatch { query, candidates }) => {
                assert_eq!(query, "ali");
                assert_eq!(candidates, vec!["alice@x.com", "alicia@x.com"]);
            }
            other => panic!("expected ambiguous match, got {other:?}"),
        }
    }

    #[test]
    fn test_unique_substring_case_insensitive() {
        let records = records(&["alice@x.com", "bob@y.org"]);
        assert_eq!(resolve_identifier(&records, "BOB").unwrap(), "bob@y.org");
    }

    #[test]
    fn test_no_match() {
        let records = records(&["alice@x.com"]);
        assert!(matches!(resolve_identifier(&records, "carol"), Err(GpError::NoMatch(_))));
        assert!(matches!(resolve_identifier(&[], "alice"), Err(GpError::NoMatch(_))));
    }

    #[test]
    fn test_position_is_one_based() {
        let records = records(&["alice@x.com", "bob@y.org"]);
        assert_eq!(resolve_identifier(&records, "1").unwrap(), "alice@x.com");
        assert_eq!(resolve_identifier(&records, " 2 ").unwrap(), "bob@y.org");
    }

    #[test]
    fn test_out_of_range_position_falls_back_to_text() {
        let records = records(&["alice@x.com", "user7@x.com"]);
        assert!(matches!(resolve_identifier(&records, "0"), Err(GpError::NoMatch(_))));
        assert_eq!(resolve_identifier(&records, "7").unwrap(), "user7@x.com");
    }

    #[test]
    fn test_exact_match_folds_non_ascii_case() {
        let records = records(&["xélise@x.com", "élise@x.com"]);
        assert_eq!(resolve_identifier(&records, "ÉLISE@X.COM").unwrap(), "élise@x.com");
    }
}
