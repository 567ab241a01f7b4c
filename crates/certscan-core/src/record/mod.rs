//! Certificate records
//!
//! A [`RawRecord`] is one 44-field row of a certificate scan dump, kept as
//! strings. [`NormalizedCert`] is the typed view the filter works on.

mod attrs;
mod cert;
mod san;

pub use attrs::{parse_attributes, AttributeMap};
pub use cert::{NormalizedCert, TIMESTAMP_FORMAT};
pub use san::parse_alt_domains;

/// Number of fields in a scan record
pub const FIELD_COUNT: usize = 44;

/// Prefix written in front of injected error messages
pub const ERROR_MARKER: &str = "***ERROR***";

/// Column of a scan record, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Field {
    CertificateId = 0,
    Sha1Fingerprint,
    SerialNumber,
    IssuerId,
    Version,
    Subject,
    Issuer,
    IsCa,
    IsSelfSigned,
    NotValidBefore,
    NotValidAfter,
    IsValid,
    OpensslValidationError,
    IsUbuntuValid,
    IsMozillaValid,
    IsWindowsValid,
    IsAppleValid,
    BasicConstraints,
    CrlDistributionPoints,
    ExtendedKeyUsage,
    AuthorityKeyIdentifier,
    SubjectKeyIdentifier,
    KeyUsage,
    CertificatePolicies,
    AuthorityInfoAccess,
    SubjectAltName,
    NsCertType,
    NsComment,
    PolicyConstraints,
    PrivateKeyUsagePeriod,
    SmimeCaps,
    IssuerAltName,
    SignatureAlgorithm,
    Depth,
    PublicKeyId,
    FirstSeenAt,
    PublicKeyType,
    InUbuntuRootStore,
    InMozillaRootStore,
    InWindowsRootStore,
    InAppleRootStore,
    IsRevoked,
    RevokedAt,
    ReasonRevoked,
}

impl Field {
    /// Column receiving injected error annotations
    pub const ERROR: Field = Field::OpensslValidationError;

    /// Browser vendor validity columns
    pub const BROWSER_VALID: [Field; 4] = [
        Field::IsUbuntuValid,
        Field::IsMozillaValid,
        Field::IsWindowsValid,
        Field::IsAppleValid,
    ];

    /// Zero-based column index
    pub fn index(self) -> usize {
        self as usize
    }

    /// Schema column name
    pub fn name(self) -> &'static str {
        FIELD_NAMES[self.index()]
    }
}

/// Schema column names, in file order
pub const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "certificate_id",
    "sha1_fingerprint",
    "serial_number",
    "issuer_id",
    "version",
    "subject",
    "issuer",
    "is_ca",
    "is_self_signed",
    "not_valid_before",
    "not_valid_after",
    "is_valid",
    "openssl_validation_error",
    "is_ubuntu_valid",
    "is_mozilla_valid",
    "is_windows_valid",
    "is_apple_valid",
    "basic_constraints",
    "crl_distribution_points",
    "extended_key_usage",
    "authority_key_identifier",
    "subject_key_identifier",
    "key_usage",
    "certificate_policies",
    "authority_info_access",
    "subject_alt_name",
    "ns_cert_type",
    "ns_comment",
    "policy_constraints",
    "private_key_usage_period",
    "smime_caps",
    "issuer_alt_name",
    "signature_algorithm",
    "depth",
    "public_key_id",
    "first_seen_at",
    "public_key_type",
    "in_ubuntu_root_store",
    "in_mozilla_root_store",
    "in_windows_root_store",
    "in_apple_root_store",
    "is_revoked",
    "revoked_at",
    "reason_revoked",
];

/// One scan row as read from the input.
///
/// Opaque until normalized. The only mutation is [`RawRecord::set_error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    fields: Vec<String>,
}

impl RawRecord {
    /// Wrap the fields of one row; the count is checked at normalization
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Number of fields present
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the row has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field value, or `""` if the row is too short
    pub fn get(&self, field: Field) -> &str {
        self.fields
            .get(field.index())
            .map_or("", String::as_str)
    }

    /// Interpret a flag column: true if it starts with `t`, case-insensitive
    pub fn flag(&self, field: Field) -> bool {
        parse_flag(self.get(field))
    }

    /// All fields in order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Consume into the field vector
    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }

    /// Record a diagnostic in the error column.
    ///
    /// Only the first error is kept: an already populated column is left
    /// alone. Returns true if the message was written.
    pub fn set_error(&mut self, message: &str) -> bool {
        match self.fields.get_mut(Field::ERROR.index()) {
            Some(slot) if slot.trim().is_empty() => {
                *slot = format!("{ERROR_MARKER} {message}");
                true
            }
            _ => false,
        }
    }
}

impl From<Vec<String>> for RawRecord {
    fn from(fields: Vec<String>) -> Self {
        Self::new(fields)
    }
}

/// `t`, `T`, `true`, `True` and the like are true; anything else is false
pub fn parse_flag(value: &str) -> bool {
    value
        .trim()
        .chars()
        .next()
        .map_or(false, |c| c.eq_ignore_ascii_case(&'t'))
}
