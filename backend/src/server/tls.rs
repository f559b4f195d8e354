//! TLS material loading for standalone deployments.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;

/// Errors raised while assembling the TLS server configuration.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    /// A PEM file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Offending file path.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The key file held no usable private key.
    #[error("no private key found in {path}")]
    MissingKey {
        /// Offending file path.
        path: String,
    },
    /// The certificate and key could not be combined.
    #[error("invalid certificate or key: {0}")]
    Invalid(#[from] rustls::Error),
}

fn read_error(path: &Path, source: io::Error) -> TlsError {
    TlsError::Read {
        path: path.display().to_string(),
        source,
    }
}

/// Load a rustls server configuration from PEM certificate and key files.
pub fn load_server_config(cert_file: &Path, key_file: &Path) -> Result<ServerConfig, TlsError> {
    let mut cert_reader = BufReader::new(
        File::open(cert_file).map_err(|err| read_error(cert_file, err))?,
    );
    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut cert_reader)
        .collect::<Result<_, _>>()
        .map_err(|err| read_error(cert_file, err))?;

    let mut key_reader =
        BufReader::new(File::open(key_file).map_err(|err| read_error(key_file, err))?);
    let key: PrivateKeyDer<'static> = rustls_pemfile::private_key(&mut key_reader)
        .map_err(|err| read_error(key_file, err))?
        .ok_or_else(|| TlsError::MissingKey {
            path: key_file.display().to_string(),
        })?;

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    #[rstest]
    fn missing_certificate_file_is_reported_with_its_path() {
        let err = load_server_config(
            &PathBuf::from("/nonexistent/server.cert"),
            &PathBuf::from("/nonexistent/server.key"),
        )
        .expect_err("missing files must fail");
        match err {
            TlsError::Read { path, .. } => assert_eq!(path, "/nonexistent/server.cert"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
