//! Ed25519 key pair persistence with serialized per-path file access
//!
//! Every load/save/delete against a key file goes through a pending-operation
//! map: at most one filesystem operation per path is physically in flight at
//! a time. A read arriving while an identical read is pending joins it and
//! reuses its result; any other combination waits for the pending operation
//! to settle and then runs as a fresh one. Entries are removed from the map
//! as soon as their operation completes, so the map only ever reflects the
//! current in-flight operation per path.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::SigningKey;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use rand::rngs::OsRng;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::token::{self, TokenClaims, TOKEN_BACKDATE_SECS, TOKEN_LIFETIME_SECS};

/// File name prefix shared by both halves of the key pair.
pub const CERT_NAME_PREFIX: &str = "heweather_ed25519_";

/// PKCS#8 v1 DER prefix for a raw Ed25519 private key (RFC 8410).
const ED25519_PRIVATE_DER_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04,
    0x20,
];

/// SPKI DER prefix for a raw Ed25519 public key (RFC 8410).
const ED25519_PUBLIC_DER_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// Fatal store error. Only directory initialization propagates; every other
/// failure is logged and reported through `bool`/`Option` return values.
#[derive(Debug, Error)]
pub enum CertStoreError {
    #[error("failed to create certificate directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Kind of file operation tracked in the pending map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOp {
    Load,
    Save,
    Remove,
}

/// Result carried by a shared pending future. Cloneable so joined readers
/// can all take the outcome.
#[derive(Debug, Clone)]
enum OpOutcome {
    Loaded(Option<String>),
    Saved(bool),
    Removed(bool),
}

impl OpOutcome {
    fn into_loaded(self) -> Option<String> {
        match self {
            OpOutcome::Loaded(text) => text,
            _ => None,
        }
    }

    fn succeeded(&self) -> bool {
        match self {
            OpOutcome::Loaded(text) => text.is_some(),
            OpOutcome::Saved(ok) | OpOutcome::Removed(ok) => *ok,
        }
    }
}

type SharedOp = Shared<BoxFuture<'static, OpOutcome>>;

struct PendingOp {
    id: u64,
    kind: FileOp,
    fut: SharedOp,
}

/// Manages one Ed25519 key pair rooted at `<root>/certs/`.
///
/// One instance exists per configured integration; all concurrent callers
/// (config flow, polling clients) share it through [`crate::ensure_store`].
pub struct CertStore {
    cert_dir: PathBuf,
    private_path: PathBuf,
    public_path: PathBuf,
    pending: Arc<Mutex<HashMap<PathBuf, PendingOp>>>,
    next_op_id: AtomicU64,
}

impl std::fmt::Debug for CertStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertStore")
            .field("cert_dir", &self.cert_dir)
            .finish_non_exhaustive()
    }
}

impl CertStore {
    /// Open a store rooted at `root`, creating `<root>/certs/` and any
    /// missing parents. Without a writable directory the store is unusable,
    /// so this is the one failure that propagates.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, CertStoreError> {
        let cert_dir = root.as_ref().join("certs");
        fs::create_dir_all(&cert_dir)
            .await
            .map_err(|source| CertStoreError::CreateDir {
                path: cert_dir.clone(),
                source,
            })?;
        debug!(path = ?cert_dir, "certificate directory ready");

        let private_path = cert_dir.join(format!("{CERT_NAME_PREFIX}private.pem"));
        let public_path = cert_dir.join(format!("{CERT_NAME_PREFIX}public.pem"));

        Ok(Self {
            cert_dir,
            private_path,
            public_path,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_op_id: AtomicU64::new(0),
        })
    }

    /// Directory both PEM files live in.
    pub fn cert_dir(&self) -> &Path {
        &self.cert_dir
    }

    /// Generate a fresh Ed25519 key pair and persist both PEM halves.
    ///
    /// This is the sole place new key material is minted. On any persistence
    /// failure both files are removed again so a half-written pair is never
    /// left behind.
    pub async fn generate_keys(&self) -> bool {
        let signing = SigningKey::generate(&mut OsRng);
        let verifying = signing.verifying_key();

        let private_pem = encode_pem(
            "PRIVATE KEY",
            &ED25519_PRIVATE_DER_PREFIX,
            &signing.to_bytes(),
        );
        let public_pem = encode_pem(
            "PUBLIC KEY",
            &ED25519_PUBLIC_DER_PREFIX,
            verifying.as_bytes(),
        );

        let saved_private = self
            .run_op(
                &self.private_path,
                FileOp::Save,
                save_file(self.private_path.clone(), private_pem),
            )
            .await
            .succeeded();
        let saved_public = self
            .run_op(
                &self.public_path,
                FileOp::Save,
                save_file(self.public_path.clone(), public_pem),
            )
            .await
            .succeeded();

        if saved_private && saved_public {
            return true;
        }

        error!("failed to persist key pair, removing partial files");
        self.destroy().await;
        false
    }

    /// Read the private key PEM. Missing, unreadable or empty files all
    /// report `None`; callers treat absence as "generate first".
    pub async fn private_key_pem(&self) -> Option<String> {
        self.run_op(
            &self.private_path,
            FileOp::Load,
            load_file(self.private_path.clone()),
        )
        .await
        .into_loaded()
    }

    /// Read the public key PEM, e.g. for display during setup.
    pub async fn public_key_pem(&self) -> Option<String> {
        self.run_op(
            &self.public_path,
            FileOp::Load,
            load_file(self.public_path.clone()),
        )
        .await
        .into_loaded()
    }

    /// Sign a token with claims `{iat, exp, sub}` and header `{kid}`.
    /// Reports `None` when no private key is present.
    pub async fn issue_token(&self, sub: &str, kid: &str, iat: i64, exp: i64) -> Option<String> {
        let Some(pem) = self.private_key_pem().await else {
            error!("token requested but no private key is present");
            return None;
        };
        token::sign(
            &pem,
            &TokenClaims {
                iat,
                exp,
                sub: sub.to_string(),
            },
            kid,
        )
    }

    /// Issue a vendor API token valid around `now` (Unix seconds), backdated
    /// and short-lived to tolerate clock skew.
    pub async fn issue_weather_token(&self, sub: &str, kid: &str, now: i64) -> Option<String> {
        self.issue_token(sub, kid, now - TOKEN_BACKDATE_SECS, now + TOKEN_LIFETIME_SECS)
            .await
    }

    /// Remove both PEM files. Missing files are not an error, so calling
    /// this repeatedly is fine.
    pub async fn destroy(&self) {
        self.run_op(
            &self.private_path,
            FileOp::Remove,
            remove_file(self.private_path.clone()),
        )
        .await;
        self.run_op(
            &self.public_path,
            FileOp::Remove,
            remove_file(self.public_path.clone()),
        )
        .await;
    }

    /// Serialize `op` against `path`.
    ///
    /// If an operation is already pending on the path and both it and `op`
    /// are loads, the pending result is reused instead of re-reading the
    /// file. Otherwise the caller waits for the pending operation to settle
    /// (discarding its result) and tries again; the new entry is inserted
    /// under the same lock acquisition that found the map slot empty, so two
    /// operations can never run against one path at the same time.
    async fn run_op<F>(&self, path: &Path, kind: FileOp, op: F) -> OpOutcome
    where
        F: std::future::Future<Output = OpOutcome> + Send + 'static,
    {
        let id = self.next_op_id.fetch_add(1, Ordering::Relaxed);
        let fut: SharedOp = op.boxed().shared();

        loop {
            let prior = {
                let mut pending = self.pending.lock().await;
                match pending.get(path) {
                    Some(p) => Some((p.kind, p.fut.clone())),
                    None => {
                        pending.insert(
                            path.to_path_buf(),
                            PendingOp {
                                id,
                                kind,
                                fut: fut.clone(),
                            },
                        );
                        None
                    }
                }
            };
            let Some((prior_kind, prior_fut)) = prior else {
                break;
            };
            if prior_kind == FileOp::Load && kind == FileOp::Load {
                return prior_fut.await;
            }
            let _ = prior_fut.await;
        }

        // Drop the map entry once the operation settles, unless a successor
        // has already replaced it.
        let watcher = fut.clone();
        let map = Arc::clone(&self.pending);
        let key = path.to_path_buf();
        tokio::spawn(async move {
            let _ = watcher.await;
            let mut pending = map.lock().await;
            if pending.get(&key).is_some_and(|p| p.id == id) {
                pending.remove(&key);
            }
        });

        fut.await
    }
}

/// PEM-armor `der_prefix || raw` under the given label. Both key bodies fit
/// a single base64 line.
fn encode_pem(label: &str, der_prefix: &[u8], raw: &[u8; 32]) -> String {
    let mut der = Vec::with_capacity(der_prefix.len() + raw.len());
    der.extend_from_slice(der_prefix);
    der.extend_from_slice(raw);
    format!(
        "-----BEGIN {label}-----\n{}\n-----END {label}-----\n",
        BASE64.encode(der)
    )
}

async fn load_file(path: PathBuf) -> OpOutcome {
    match fs::read_to_string(&path).await {
        Ok(text) if text.is_empty() => {
            error!(path = ?path, "load error, empty file");
            OpOutcome::Loaded(None)
        }
        Ok(text) => OpOutcome::Loaded(Some(text)),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = ?path, "load skipped, file does not exist");
            OpOutcome::Loaded(None)
        }
        Err(err) => {
            error!(path = ?path, %err, "load error");
            OpOutcome::Loaded(None)
        }
    }
}

async fn save_file(path: PathBuf, data: String) -> OpOutcome {
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent).await {
            error!(path = ?path, %err, "save error, cannot create parent directory");
            return OpOutcome::Saved(false);
        }
    }
    match fs::write(&path, data.as_bytes()).await {
        Ok(()) => OpOutcome::Saved(true),
        Err(err) => {
            error!(path = ?path, %err, "save error");
            OpOutcome::Saved(false)
        }
    }
}

async fn remove_file(path: PathBuf) -> OpOutcome {
    match fs::remove_file(&path).await {
        Ok(()) => OpOutcome::Removed(true),
        Err(err) if err.kind() == ErrorKind::NotFound => OpOutcome::Removed(true),
        Err(err) => {
            error!(path = ?path, %err, "remove error");
            OpOutcome::Removed(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
    use tempfile::TempDir;

    fn pem_body(pem: &str) -> Vec<u8> {
        let body: String = pem
            .lines()
            .filter(|line| !line.starts_with("-----"))
            .collect();
        BASE64.decode(body).unwrap()
    }

    #[tokio::test]
    async fn test_generate_then_public_key_pem() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::open(temp_dir.path()).await.unwrap();

        assert!(store.generate_keys().await);

        let pem = store.public_key_pem().await.unwrap();
        assert!(pem.contains("-----BEGIN PUBLIC KEY-----"));
        assert!(pem.contains("-----END PUBLIC KEY-----"));

        let der = pem_body(&pem);
        assert_eq!(der.len(), ED25519_PUBLIC_DER_PREFIX.len() + 32);
        assert_eq!(&der[..ED25519_PUBLIC_DER_PREFIX.len()], ED25519_PUBLIC_DER_PREFIX);
    }

    #[tokio::test]
    async fn test_private_pem_has_pkcs8_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::open(temp_dir.path()).await.unwrap();
        assert!(store.generate_keys().await);

        let der = pem_body(&store.private_key_pem().await.unwrap());
        assert_eq!(der.len(), ED25519_PRIVATE_DER_PREFIX.len() + 32);
        assert_eq!(&der[..ED25519_PRIVATE_DER_PREFIX.len()], ED25519_PRIVATE_DER_PREFIX);
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::open(temp_dir.path()).await.unwrap();
        assert!(store.generate_keys().await);

        let now = chrono::Utc::now().timestamp();
        let token = store
            .issue_weather_token("project-id", "key-id", now)
            .await
            .unwrap();

        let header = decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::EdDSA);
        assert_eq!(header.kid.as_deref(), Some("key-id"));

        let public_pem = store.public_key_pem().await.unwrap();
        let key = DecodingKey::from_ed_pem(public_pem.as_bytes()).unwrap();
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.validate_exp = true;
        let claims = decode::<TokenClaims>(&token, &key, &validation)
            .unwrap()
            .claims;
        assert_eq!(claims.sub, "project-id");
        assert_eq!(claims.iat, now - TOKEN_BACKDATE_SECS);
        assert_eq!(claims.exp, now + TOKEN_LIFETIME_SECS);
    }

    #[tokio::test]
    async fn test_missing_key_boundaries() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::open(temp_dir.path()).await.unwrap();

        assert!(store.public_key_pem().await.is_none());
        assert!(store.private_key_pem().await.is_none());
        assert!(store
            .issue_weather_token("sub", "kid", 1_700_000_000)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_file_layout_and_destroy() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::open(temp_dir.path()).await.unwrap();
        assert!(store.generate_keys().await);

        let private = temp_dir
            .path()
            .join("certs")
            .join(format!("{CERT_NAME_PREFIX}private.pem"));
        let public = temp_dir
            .path()
            .join("certs")
            .join(format!("{CERT_NAME_PREFIX}public.pem"));
        assert!(private.exists());
        assert!(public.exists());

        store.destroy().await;
        assert!(!private.exists());
        assert!(!public.exists());
    }

    #[tokio::test]
    async fn test_destroy_twice_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::open(temp_dir.path()).await.unwrap();
        assert!(store.generate_keys().await);

        store.destroy().await;
        store.destroy().await;
        assert!(store.public_key_pem().await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_token_issuance() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(CertStore::open(temp_dir.path()).await.unwrap());
        assert!(store.generate_keys().await);

        let public_pem = store.public_key_pem().await.unwrap();
        let now = chrono::Utc::now().timestamp();

        let tokens = futures::future::join_all((0..8).map(|_| {
            let store = Arc::clone(&store);
            async move { store.issue_weather_token("sub", "kid", now).await }
        }))
        .await;

        let key = DecodingKey::from_ed_pem(public_pem.as_bytes()).unwrap();
        let validation = Validation::new(Algorithm::EdDSA);
        for token in tokens {
            let token = token.expect("every concurrent issuance succeeds");
            decode::<TokenClaims>(&token, &key, &validation).unwrap();
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_path_ops_never_overlap() {
        use std::sync::atomic::AtomicUsize;
        use tokio::sync::Barrier;

        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(CertStore::open(temp_dir.path()).await.unwrap());
        let path = store.private_path.clone();
        let in_flight = Arc::new(AtomicUsize::new(0));

        for _ in 0..200 {
            let barrier = Arc::new(Barrier::new(4));
            let tasks: Vec<_> = (0..4)
                .map(|_| {
                    let store = Arc::clone(&store);
                    let path = path.clone();
                    let barrier = Arc::clone(&barrier);
                    let in_flight = Arc::clone(&in_flight);
                    tokio::spawn(async move {
                        barrier.wait().await;
                        store
                            .run_op(&path, FileOp::Save, async move {
                                let live = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                                assert_eq!(live, 1, "{live} operations in flight on one path");
                                tokio::task::yield_now().await;
                                in_flight.fetch_sub(1, Ordering::SeqCst);
                                OpOutcome::Saved(true)
                            })
                            .await
                    })
                })
                .collect();
            for task in tasks {
                task.await.unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_reads_agree() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(CertStore::open(temp_dir.path()).await.unwrap());
        assert!(store.generate_keys().await);

        let reads = futures::future::join_all((0..4).map(|_| {
            let store = Arc::clone(&store);
            async move { store.public_key_pem().await }
        }))
        .await;

        let first = reads[0].clone().unwrap();
        for read in reads {
            assert_eq!(read.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn test_regenerate_overwrites_pair() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::open(temp_dir.path()).await.unwrap();

        assert!(store.generate_keys().await);
        let first = store.public_key_pem().await.unwrap();
        assert!(store.generate_keys().await);
        let second = store.public_key_pem().await.unwrap();

        assert_ne!(first, second);
    }
}
