#![allow(dead_code)]

use async_trait::async_trait;
use fsstore::{Crypter, Envelope, FsStore, MemoryLog, OpLog, OpLogError, StoreConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Keyed XOR cipher with a trailing key tag so a wrong key fails to decrypt
pub struct TestCrypter {
    key: u8,
    counter: AtomicU64,
}

impl TestCrypter {
    pub fn new(key: u8) -> Arc<Self> {
        Arc::new(Self {
            key,
            counter: AtomicU64::new(0),
        })
    }

    fn apply(&self, data: &[u8], iv: &[u8]) -> Vec<u8> {
        data.iter()
            .enumerate()
            .map(|(i, b)| b ^ self.key ^ iv[i % iv.len()])
            .collect()
    }
}

#[async_trait]
impl Crypter for TestCrypter {
    async fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope, OpLogError> {
        let iv = self.counter.fetch_add(1, Ordering::SeqCst).to_le_bytes().to_vec();
        let mut ciphertext = self.apply(plaintext, &iv);
        ciphertext.push(self.key);
        Ok(Envelope { ciphertext, iv })
    }

    async fn decrypt(&self, ciphertext: &[u8], iv: &[u8]) -> Result<Vec<u8>, OpLogError> {
        match ciphertext.split_last() {
            Some((tag, body)) if *tag == self.key && !iv.is_empty() => Ok(self.apply(body, iv)),
            _ => Err(OpLogError::crypter("authentication failed")),
        }
    }
}

pub async fn open(log: Arc<dyn OpLog>, crypter: Option<Arc<dyn Crypter>>) -> FsStore {
    diagnostics::init();
    FsStore::open(log, crypter, StoreConfig::default())
        .await
        .unwrap()
}

/// A fresh plaintext store and a fresh encrypted store
pub async fn stores() -> Vec<FsStore> {
    let crypter: Arc<dyn Crypter> = TestCrypter::new(0x5c);
    vec![
        open(Arc::new(MemoryLog::new()), None).await,
        open(Arc::new(MemoryLog::new()), Some(crypter)).await,
    ]
}
