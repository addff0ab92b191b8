//! Pattern-based redaction of secrets and PII in loggable text.
//!
//! Masking is a best-effort defense-in-depth layer over free-form text, not a
//! completeness guarantee. Three passes run in order: full-mask fields (structured
//! and loose forms), partial-mask fields (structured form, last 4 revealed), then a
//! field-name-independent sweep over standalone 13–19 digit runs. The mask token
//! itself never re-matches, so masking already-masked text is a no-op.

// std
use std::sync::LazyLock;
// crates.io
use regex::{Captures, Regex};

/// Replacement token emitted for redacted material.
pub const MASK: &str = "****";

/// Field names whose values are fully redacted regardless of length.
const FULL_MASK_FIELDS: &[&str] = &[
	"serverKey",
	"clientKey",
	"apiKey",
	"secretKey",
	"signatureKey",
	"password",
	"token",
	"secret",
	"callbackToken",
	"verificationToken",
	"authorization",
	"x-api-key",
	"x-signature",
	"signature_key",
];
/// Field names whose values reveal only their last four characters.
const PARTIAL_MASK_FIELDS: &[&str] = &[
	"accountNumber",
	"virtualAccountNumber",
	"bankAccount",
	"cardNumber",
	"phoneNumber",
	"va_number",
	"account_number",
];

static FULL_STRUCTURED: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(&format!(r#"(?i)("(?:{})"\s*:\s*")[^"]+(")"#, FULL_MASK_FIELDS.join("|")))
		.expect("Hardcoded structured full-mask pattern should compile.")
});
static FULL_LOOSE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(&format!(r#"(?i)\b((?:{})\s*[=:]\s*)[^\s,}}"]+"#, FULL_MASK_FIELDS.join("|")))
		.expect("Hardcoded loose full-mask pattern should compile.")
});
static PARTIAL_STRUCTURED: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(&format!(
		r#"(?i)("(?:{})"\s*:\s*")([^"]*?)(.{{0,4}})(")"#,
		PARTIAL_MASK_FIELDS.join("|")
	))
	.expect("Hardcoded partial-mask pattern should compile.")
});
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\b\d{13,19}\b").expect("Hardcoded digit-run pattern should compile.")
});

/// Redacts secrets and PII in the given text.
pub fn mask(input: &str) -> String {
	let full_structured_replacement = format!("${{1}}{MASK}${{2}}");
	let full_loose_replacement = format!("${{1}}{MASK}");
	let partial_replacement = format!("${{1}}{MASK}${{3}}${{4}}");
	let step = FULL_STRUCTURED.replace_all(input, full_structured_replacement.as_str());
	let step = FULL_LOOSE.replace_all(&step, full_loose_replacement.as_str()).into_owned();
	let step = PARTIAL_STRUCTURED.replace_all(&step, partial_replacement.as_str()).into_owned();

	DIGIT_RUN
		.replace_all(&step, |caps: &Captures| {
			let digits = &caps[0];

			format!("{MASK}{}", &digits[digits.len() - 4..])
		})
		.into_owned()
}

/// Serializes a JSON payload and redacts it for logging.
pub fn mask_value(value: &serde_json::Value) -> String {
	mask(&value.to_string())
}

/// Reveals only the last four characters of an account number.
pub fn mask_account_number(value: &str) -> String {
	let chars = value.chars().collect::<Vec<_>>();

	if chars.len() < 4 {
		return MASK.to_owned();
	}

	let tail = chars[chars.len() - 4..].iter().collect::<String>();

	format!("{MASK}{tail}")
}

/// Fully redacts an API key regardless of its content.
pub fn mask_api_key(value: &str) -> String {
	let _ = value;

	MASK.to_owned()
}
