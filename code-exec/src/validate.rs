use crate::{
    error::Error,
    languages::{self, LanguageProfile},
    types::ExecutionRequest,
};

/// A request that passed validation, bound to its language profile.
#[derive(Debug, Clone)]
pub struct Submission {
    pub profile: &'static LanguageProfile,
    pub code: String,
    pub input: Option<String>,
}

/// Reject incomplete requests and unknown languages. Performs no I/O.
pub fn validate(request: ExecutionRequest) -> Result<Submission, Error> {
    let (language, code) = match (request.language, request.code) {
        (Some(language), Some(code)) if !language.is_empty() && !code.is_empty() => {
            (language, code)
        }
        _ => return Err(Error::InvalidRequest("Missing language or code".into())),
    };

    let profile =
        languages::lookup(&language).ok_or(Error::UnsupportedLanguage(language))?;

    Ok(Submission {
        profile,
        code,
        input: request.input,
    })
}
