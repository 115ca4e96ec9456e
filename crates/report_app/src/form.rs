use report_core::FormData;
use thiserror::Error;

/// Fields the report server reads; the server validates them, not the client.
pub const KNOWN_FIELDS: [&str; 4] = ["participant_id", "start_date", "output_format", "report_id"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("argument `{0}` is not a key=value pair")]
    MissingSeparator(String),
    #[error("argument `{0}` has an empty field name")]
    EmptyKey(String),
}

/// Builds the form from `key=value` arguments, keeping their order. Only the
/// first `=` separates; the value may be empty or contain further `=`.
pub fn parse_form<I, S>(args: I) -> Result<FormData, FormError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut form = FormData::new();
    for arg in args {
        let arg = arg.as_ref();
        let Some((key, value)) = arg.split_once('=') else {
            return Err(FormError::MissingSeparator(arg.to_string()));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(FormError::EmptyKey(arg.to_string()));
        }
        form.push(key, value);
    }
    Ok(form)
}

pub fn missing_known_fields(form: &FormData) -> Vec<&'static str> {
    KNOWN_FIELDS
        .into_iter()
        .filter(|name| form.get(name).is_none())
        .collect()
}
