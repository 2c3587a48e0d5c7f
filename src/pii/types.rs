//! PII type definitions and metadata

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Risk level associated with a PII category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// PII category enumeration
///
/// The category set is closed and fixed for the process lifetime; metadata
/// lookups are static match tables rather than runtime registries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PiiType {
    /// Social Security Number
    Ssn,
    /// Email address
    Email,
    /// Telephone number
    PhoneNumber,
    /// Physical address
    Address,
    /// Payment card number
    CreditCard,
    /// Date of birth
    DateOfBirth,
    /// Passport number
    Passport,
    /// Driver's license number
    DriverLicense,
    /// IPv4/IPv6 address
    IpAddress,
    /// Person name
    Name,
    /// Bank account number
    BankAccount,
    /// International Bank Account Number
    Iban,
    /// SWIFT/BIC code
    SwiftCode,
    /// AWS access key id
    AwsAccessKey,
    /// AWS secret access key
    AwsSecretKey,
    /// Individual Tax Identification Number (US)
    Itin,
    /// UK National Insurance Number
    NationalInsuranceNumber,
    /// Account username
    Username,
    /// Password or other login secret
    Password,
    /// Hardware MAC address
    MacAddress,
}

impl PiiType {
    /// All categories, in declaration order
    pub const ALL: [PiiType; 20] = [
        Self::Ssn,
        Self::Email,
        Self::PhoneNumber,
        Self::Address,
        Self::CreditCard,
        Self::DateOfBirth,
        Self::Passport,
        Self::DriverLicense,
        Self::IpAddress,
        Self::Name,
        Self::BankAccount,
        Self::Iban,
        Self::SwiftCode,
        Self::AwsAccessKey,
        Self::AwsSecretKey,
        Self::Itin,
        Self::NationalInsuranceNumber,
        Self::Username,
        Self::Password,
        Self::MacAddress,
    ];

    /// Get the human-readable display name for the category
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ssn => "Social Security Number",
            Self::Email => "Email Address",
            Self::PhoneNumber => "Phone Number",
            Self::Address => "Physical Address",
            Self::CreditCard => "Credit Card Number",
            Self::DateOfBirth => "Date of Birth",
            Self::Passport => "Passport Number",
            Self::DriverLicense => "Driver's License",
            Self::IpAddress => "IP Address",
            Self::Name => "Person Name",
            Self::BankAccount => "Bank Account Number",
            Self::Iban => "International Bank Account Number",
            Self::SwiftCode => "SWIFT/BIC Code",
            Self::AwsAccessKey => "AWS Access Key",
            Self::AwsSecretKey => "AWS Secret Key",
            Self::Itin => "Individual Tax Identification Number",
            Self::NationalInsuranceNumber => "National Insurance Number",
            Self::Username => "Username",
            Self::Password => "Password",
            Self::MacAddress => "MAC Address",
        }
    }

    /// Get the wire label for the category (matches the serde representation)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ssn => "SSN",
            Self::Email => "EMAIL",
            Self::PhoneNumber => "PHONE_NUMBER",
            Self::Address => "ADDRESS",
            Self::CreditCard => "CREDIT_CARD",
            Self::DateOfBirth => "DATE_OF_BIRTH",
            Self::Passport => "PASSPORT",
            Self::DriverLicense => "DRIVER_LICENSE",
            Self::IpAddress => "IP_ADDRESS",
            Self::Name => "NAME",
            Self::BankAccount => "BANK_ACCOUNT",
            Self::Iban => "IBAN",
            Self::SwiftCode => "SWIFT_CODE",
            Self::AwsAccessKey => "AWS_ACCESS_KEY",
            Self::AwsSecretKey => "AWS_SECRET_KEY",
            Self::Itin => "ITIN",
            Self::NationalInsuranceNumber => "NATIONAL_INSURANCE_NUMBER",
            Self::Username => "USERNAME",
            Self::Password => "PASSWORD",
            Self::MacAddress => "MAC_ADDRESS",
        }
    }

    /// Get the governance tags applied when a field classifies as this category
    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            Self::Ssn => &["PII", "PII-SSN"],
            Self::Email => &["PII", "PII-Email"],
            Self::PhoneNumber => &["PII", "PII-Phone-Number"],
            Self::Address => &["PII", "PII-Address"],
            Self::CreditCard => &["PII", "PII-Credit-Card"],
            Self::DateOfBirth => &["PII", "PII-Date-Of-Birth"],
            Self::Passport => &["PII", "PII-Passport"],
            Self::DriverLicense => &["PII", "PII-Driver-License"],
            Self::IpAddress => &["PII", "PII-IP-Address"],
            Self::Name => &["PII", "PII-Name"],
            Self::BankAccount => &["PII", "PII-Bank-Account"],
            Self::Iban => &["PII", "PII-IBAN"],
            Self::SwiftCode => &["PII", "PII-SWIFT"],
            Self::AwsAccessKey => &["PII", "PII-AWS-Access-Key", "SECRET"],
            Self::AwsSecretKey => &["PII", "PII-AWS-Secret-Key", "SECRET"],
            Self::Itin => &["PII", "PII-ITIN"],
            Self::NationalInsuranceNumber => &["PII", "PII-NI-Number"],
            Self::Username => &["PII", "PII-Username"],
            Self::Password => &["PII", "PII-Password", "SECRET"],
            Self::MacAddress => &["PII", "PII-MAC-Address"],
        }
    }

    /// Get the risk level for the category
    pub fn risk_level(&self) -> RiskLevel {
        match self {
            Self::Ssn
            | Self::CreditCard
            | Self::Passport
            | Self::DriverLicense
            | Self::BankAccount
            | Self::Iban
            | Self::AwsAccessKey
            | Self::AwsSecretKey
            | Self::Itin
            | Self::NationalInsuranceNumber
            | Self::Password => RiskLevel::High,
            Self::Email
            | Self::PhoneNumber
            | Self::Address
            | Self::DateOfBirth
            | Self::Name
            | Self::SwiftCode => RiskLevel::Medium,
            Self::IpAddress | Self::Username | Self::MacAddress => RiskLevel::Low,
        }
    }
}

impl fmt::Display for PiiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for PiiType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SSN" => Ok(Self::Ssn),
            "EMAIL" => Ok(Self::Email),
            "PHONE_NUMBER" => Ok(Self::PhoneNumber),
            "ADDRESS" => Ok(Self::Address),
            "CREDIT_CARD" => Ok(Self::CreditCard),
            "DATE_OF_BIRTH" => Ok(Self::DateOfBirth),
            "PASSPORT" => Ok(Self::Passport),
            "DRIVER_LICENSE" => Ok(Self::DriverLicense),
            "IP_ADDRESS" => Ok(Self::IpAddress),
            "NAME" => Ok(Self::Name),
            "BANK_ACCOUNT" => Ok(Self::BankAccount),
            "IBAN" => Ok(Self::Iban),
            "SWIFT_CODE" => Ok(Self::SwiftCode),
            "AWS_ACCESS_KEY" => Ok(Self::AwsAccessKey),
            "AWS_SECRET_KEY" => Ok(Self::AwsSecretKey),
            "ITIN" => Ok(Self::Itin),
            "NATIONAL_INSURANCE_NUMBER" => Ok(Self::NationalInsuranceNumber),
            "USERNAME" => Ok(Self::Username),
            "PASSWORD" => Ok(Self::Password),
            "MAC_ADDRESS" => Ok(Self::MacAddress),
            _ => Err(format!("Unknown PII type: {s}")),
        }
    }
}

/// One raw PII signal for one field value, produced by one detector backend
///
/// Detections are immutable and short-lived: they are consumed by the
/// aggregation and conflict-resolution pipeline as soon as they are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Detected category
    pub pii_type: PiiType,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f64,
    /// The field value the detection fired on
    pub value: String,
    /// The pattern (or hint) that matched
    pub matched_pattern: String,
    /// Field name, when the detector had it for context
    pub field_name: Option<String>,
}

impl Detection {
    /// Create a new detection, clamping confidence to [0, 1]
    pub fn new(
        pii_type: PiiType,
        confidence: f64,
        value: impl Into<String>,
        matched_pattern: impl Into<String>,
    ) -> Self {
        Self {
            pii_type,
            confidence: confidence.clamp(0.0, 1.0),
            value: value.into(),
            matched_pattern: matched_pattern.into(),
            field_name: None,
        }
    }

    /// Attach the field name the value was read from
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }
}
