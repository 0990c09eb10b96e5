//! Client certificate bundle inspection
//!
//! Reads a PKCS#12 bundle from disk and extracts the certificate's validity
//! window without opening any connection. The result is advisory: the secure
//! channel loads the bundle again on first use and is the authoritative check.

use std::io::ErrorKind;
use std::path::Path;

use bankpartner_domain::{CertificateInfo, Result, SdkError};
use chrono::{DateTime, Utc};
use openssl::asn1::{Asn1Time, Asn1TimeRef};
use openssl::pkcs12::Pkcs12;
use openssl::x509::X509NameRef;
use tracing::debug;

use crate::errors::IntoSdkError;

/// Read the raw bundle bytes.
///
/// # Errors
/// `SdkError::CertificateNotFound` when the path does not resolve to a
/// readable file.
pub fn read_bundle(path: &Path) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(SdkError::certificate_not_found(path)),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "certificate bundle is not readable");
            Err(SdkError::certificate_not_found(path))
        }
    }
}

/// Load the bundle at `path` and return the certificate's validity window.
///
/// # Errors
/// - `SdkError::CertificateNotFound` for a missing or unreadable file
/// - `SdkError::Certificate` for a corrupt bundle, a wrong password or a
///   bundle without a certificate
pub fn inspect(path: &Path, password: &str) -> Result<CertificateInfo> {
    let bytes = read_bundle(path)?;

    let bundle = Pkcs12::from_der(&bytes)
        .map_err(|err| SdkError::certificate(format!("not a PKCS#12 bundle: {err}")))?;
    let parsed = bundle
        .parse2(password)
        .map_err(|_| SdkError::certificate("wrong password or corrupt PKCS#12 bundle"))?;
    let cert =
        parsed.cert.ok_or_else(|| SdkError::certificate("bundle does not contain a certificate"))?;

    let info = CertificateInfo {
        subject: describe_name(cert.subject_name()),
        not_before: to_utc(cert.not_before())?,
        not_after: to_utc(cert.not_after())?,
    };

    debug!(subject = %info.subject, not_after = %info.not_after, "inspected client certificate");
    Ok(info)
}

/// Human-readable notice for a certificate that is expired or expires within
/// `threshold_days` of `now`. Returns `None` when no notice is due.
pub fn expiry_warning(
    info: &CertificateInfo,
    now: DateTime<Utc>,
    threshold_days: u32,
) -> Option<String> {
    let date = info.not_after.format("%Y-%m-%d");

    if info.is_expired_at(now) {
        return Some(format!(
            "Certificate expired on {date}; requests will be rejected until it is renewed"
        ));
    }

    let days_left = info.days_until_expiry(now);
    if days_left < i64::from(threshold_days) {
        return Some(format!(
            "Certificate expires on {date} ({days_left} days left), within the \
             {threshold_days}-day renewal window"
        ));
    }

    None
}

fn to_utc(time: &Asn1TimeRef) -> Result<DateTime<Utc>> {
    let epoch = Asn1Time::from_unix(0).map_err(IntoSdkError::into_sdk_error)?;
    let diff = epoch.diff(time).map_err(IntoSdkError::into_sdk_error)?;
    let seconds = i64::from(diff.days) * 86_400 + i64::from(diff.secs);

    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| SdkError::certificate(format!("certificate date out of range: {time}")))
}

fn describe_name(name: &X509NameRef) -> String {
    name.entries()
        .filter_map(|entry| {
            let key = entry.object().nid().short_name().ok()?;
            let value = entry.data().as_utf8().ok()?;
            Some(format!("{key}={value}"))
        })
        .collect::<Vec<_>>()
        .join(", ")
}
