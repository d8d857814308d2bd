//! Request-shape validators: presence, length and enum membership only.
//! Business rules (duplicates, state guards) live in the services.

use super::error::FieldError;
use crate::models::{EquipmentStatus, MovementType, UserRole};

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Normalizes page/limit query params. Out-of-range values are clamped, not
/// rejected.
#[must_use]
pub fn pagination(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    (page, limit)
}

/// Required string with a minimum length; pushes a field error and returns
/// `None` when absent or too short.
pub fn require_min_len(
    details: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
    min: usize,
) -> Option<String> {
    match value.map(str::trim) {
        None | Some("") => {
            details.push(FieldError::new(field, "Campo obrigatório"));
            None
        }
        Some(v) if v.chars().count() < min => {
            details.push(FieldError::new(
                field,
                format!("Deve ter ao menos {min} caracteres"),
            ));
            None
        }
        Some(v) => Some(v.to_string()),
    }
}

/// Optional string with a minimum length when present. Empty values count as
/// absent.
pub fn optional_min_len(
    details: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
    min: usize,
) -> Option<String> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(v) if v.chars().count() < min => {
            details.push(FieldError::new(
                field,
                format!("Deve ter ao menos {min} caracteres"),
            ));
            None
        }
        Some(v) => Some(v.to_string()),
    }
}

/// Required positive integer reference.
pub fn require_id(details: &mut Vec<FieldError>, field: &str, value: Option<i32>) -> Option<i32> {
    match value {
        None => {
            details.push(FieldError::new(field, "Campo obrigatório"));
            None
        }
        Some(v) if v <= 0 => {
            details.push(FieldError::new(field, "Deve ser um inteiro positivo"));
            None
        }
        Some(v) => Some(v),
    }
}

/// Optional digits-only string (asset tags).
pub fn optional_numeric_string(
    details: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(v) if !v.chars().all(|c| c.is_ascii_digit()) => {
            details.push(FieldError::new(field, "Deve conter apenas dígitos"));
            None
        }
        Some(v) => Some(v.to_string()),
    }
}

pub fn require_movement_type(
    details: &mut Vec<FieldError>,
    value: Option<&str>,
) -> Option<MovementType> {
    match value.map(str::trim) {
        None | Some("") => {
            details.push(FieldError::new("movement_type", "Campo obrigatório"));
            None
        }
        Some(v) => match MovementType::parse(v) {
            Some(t) => Some(t),
            None => {
                details.push(FieldError::new(
                    "movement_type",
                    "Deve ser ENTRADA ou SAIDA",
                ));
                None
            }
        },
    }
}

pub fn optional_movement_type(
    details: &mut Vec<FieldError>,
    value: Option<&str>,
) -> Option<MovementType> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(v) => match MovementType::parse(v) {
            Some(t) => Some(t),
            None => {
                details.push(FieldError::new(
                    "movement_type",
                    "Deve ser ENTRADA ou SAIDA",
                ));
                None
            }
        },
    }
}

/// List filter may only name the two non-terminal statuses; `DESCARTADO`
/// rows are reachable through the ledger and the analytics, not the list.
pub fn optional_status_filter(
    details: &mut Vec<FieldError>,
    value: Option<&str>,
) -> Option<EquipmentStatus> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(v) => match EquipmentStatus::parse(v) {
            Some(status) if status != EquipmentStatus::Descartado => Some(status),
            _ => {
                details.push(FieldError::new(
                    "status",
                    "Deve ser NO_DEPOSITO ou FORA_DEPOSITO",
                ));
                None
            }
        },
    }
}

pub fn optional_role(details: &mut Vec<FieldError>, value: Option<&str>) -> Option<UserRole> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(v) => match UserRole::parse(v) {
            Some(role) => Some(role),
            None => {
                details.push(FieldError::new("role", "Deve ser USUARIO ou ADMIN"));
                None
            }
        },
    }
}

pub fn optional_date(
    details: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
) -> Option<chrono::NaiveDate> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(v) => match chrono::NaiveDate::parse_from_str(v, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                details.push(FieldError::new(field, "Data inválida (use AAAA-MM-DD)"));
                None
            }
        },
    }
}

pub fn optional_timestamp(
    details: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(v) => match chrono::DateTime::parse_from_rfc3339(v) {
            Ok(_) => Some(v.to_string()),
            Err(_) => {
                details.push(FieldError::new(field, "Data/hora inválida (use RFC 3339)"));
                None
            }
        },
    }
}

/// Range bound for ledger queries: accepts a full RFC 3339 timestamp as-is,
/// or a plain date expanded to the start/end of that day.
pub fn optional_range_bound(
    details: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
    end_of_day: bool,
) -> Option<String> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(v) => {
            if chrono::DateTime::parse_from_rfc3339(v).is_ok() {
                return Some(v.to_string());
            }
            match chrono::NaiveDate::parse_from_str(v, "%Y-%m-%d") {
                Ok(date) if end_of_day => Some(format!("{date}T23:59:59.999999999+00:00")),
                Ok(date) => Some(format!("{date}T00:00:00")),
                Err(_) => {
                    details.push(FieldError::new(
                        field,
                        "Data inválida (use AAAA-MM-DD ou RFC 3339)",
                    ));
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(pagination(None, None), (1, 10));
        assert_eq!(pagination(Some(0), Some(0)), (1, 1));
        assert_eq!(pagination(Some(2), Some(500)), (2, 100));
    }

    #[test]
    fn require_min_len_flags_missing_and_short() {
        let mut details = vec![];
        assert!(require_min_len(&mut details, "name", None, 3).is_none());
        assert!(require_min_len(&mut details, "name", Some("  "), 3).is_none());
        assert!(require_min_len(&mut details, "name", Some("ab"), 3).is_none());
        assert_eq!(details.len(), 3);

        let mut details = vec![];
        assert_eq!(
            require_min_len(&mut details, "name", Some("  abc  "), 3).as_deref(),
            Some("abc")
        );
        assert!(details.is_empty());
    }

    #[test]
    fn status_filter_rejects_terminal_state() {
        let mut details = vec![];
        assert!(optional_status_filter(&mut details, Some("DESCARTADO")).is_none());
        assert_eq!(details.len(), 1);

        let mut details = vec![];
        assert_eq!(
            optional_status_filter(&mut details, Some("NO_DEPOSITO")),
            Some(EquipmentStatus::NoDeposito)
        );
        assert!(details.is_empty());
    }

    #[test]
    fn movement_type_membership() {
        let mut details = vec![];
        assert_eq!(
            require_movement_type(&mut details, Some("SAIDA")),
            Some(MovementType::Saida)
        );
        assert!(require_movement_type(&mut details, Some("EMPRESTIMO")).is_none());
        assert!(require_movement_type(&mut details, None).is_none());
        assert_eq!(details.len(), 2);
    }

    #[test]
    fn numeric_string_rejects_letters() {
        let mut details = vec![];
        assert_eq!(
            optional_numeric_string(&mut details, "asset_tag", Some("00123")).as_deref(),
            Some("00123")
        );
        assert!(optional_numeric_string(&mut details, "asset_tag", Some("12a")).is_none());
        assert_eq!(details.len(), 1);
    }

    #[test]
    fn range_bound_expands_dates() {
        let mut details = vec![];
        assert_eq!(
            optional_range_bound(&mut details, "from", Some("2026-01-15"), false).as_deref(),
            Some("2026-01-15T00:00:00")
        );
        assert_eq!(
            optional_range_bound(&mut details, "to", Some("2026-01-15"), true).as_deref(),
            Some("2026-01-15T23:59:59.999999999+00:00")
        );
        assert!(optional_range_bound(&mut details, "to", Some("15/01/2026"), true).is_none());
        assert_eq!(details.len(), 1);
    }
}
