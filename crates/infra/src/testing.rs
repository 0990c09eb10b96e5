//! Test fixtures shared by unit and integration tests
//!
//! Available with the `test-utils` feature.

use std::io::Write;
use std::path::Path;

use chrono::Utc;
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::x509::{X509Builder, X509NameBuilder};
use tempfile::NamedTempFile;

/// Common name of every generated fixture certificate
pub const FIXTURE_COMMON_NAME: &str = "bankpartner-test";

/// Self-signed PKCS#12 bundle written to a temporary `.pfx` file
///
/// The file is deleted when the fixture is dropped.
pub struct CertificateFixture {
    file: NamedTempFile,
}

impl CertificateFixture {
    /// Bundle whose certificate expires `days` from now; negative values
    /// produce an already expired certificate
    pub fn expiring_in_days(days: i64, password: &str) -> Self {
        let now = Utc::now().timestamp();
        let not_after = now + days * 86_400;
        let not_before = not_after.min(now) - 365 * 86_400;

        let rsa = Rsa::generate(2048).expect("generate RSA key");
        let pkey = PKey::from_rsa(rsa).expect("wrap RSA key");

        let mut name = X509NameBuilder::new().expect("name builder");
        name.append_entry_by_text("CN", FIXTURE_COMMON_NAME).expect("common name");
        let name = name.build();

        let mut builder = X509Builder::new().expect("x509 builder");
        builder.set_version(2).expect("version");
        let serial = BigNum::from_u32(1).and_then(|n| n.to_asn1_integer()).expect("serial");
        builder.set_serial_number(&serial).expect("set serial");
        builder.set_subject_name(&name).expect("subject");
        builder.set_issuer_name(&name).expect("issuer");
        builder.set_pubkey(&pkey).expect("public key");
        builder
            .set_not_before(&Asn1Time::from_unix(not_before).expect("not before"))
            .expect("set not before");
        builder
            .set_not_after(&Asn1Time::from_unix(not_after).expect("not after"))
            .expect("set not after");
        builder.sign(&pkey, MessageDigest::sha256()).expect("sign certificate");
        let cert = builder.build();

        let bundle = Pkcs12::builder()
            .name("bankpartner")
            .pkey(&pkey)
            .cert(&cert)
            .build2(password)
            .expect("build PKCS#12 bundle");

        Self::from_bytes(&bundle.to_der().expect("encode PKCS#12 bundle"))
    }

    /// Arbitrary bytes written to a `.pfx` file, for corrupt-bundle cases
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut file = tempfile::Builder::new()
            .prefix("bankpartner-cert-")
            .suffix(".pfx")
            .tempfile()
            .expect("create certificate file");
        file.write_all(bytes).expect("write certificate file");
        file.flush().expect("flush certificate file");
        Self { file }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
