//! Symmetric payload encryption: AES-256-CBC with a fresh random IV per
//! call, encoded as `hex(iv) + ":" + hex(ciphertext)`.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const IV_LEN: usize = 16;

#[derive(Clone)]
pub struct SecretCipher {
    key: [u8; 32],
}

impl SecretCipher {
    pub fn new(key: [u8; 32]) -> Self {
        SecretCipher { key }
    }

    /// Encrypt `plaintext`. The IV is random per call, so two encryptions of
    /// the same input produce different output.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let mut iv = [0u8; IV_LEN];
        rand::thread_rng().fill_bytes(&mut iv);
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        format!("{}:{}", hex::encode(iv), hex::encode(ciphertext))
    }

    /// Decrypt the `hexiv:hexct` encoding. Every malformed input (missing
    /// separator, bad hex, wrong IV length, padding failure, non-UTF-8
    /// plaintext) collapses to `None`.
    pub fn decrypt(&self, encoded: &str) -> Option<String> {
        let (iv_hex, ct_hex) = encoded.split_once(':')?;
        let iv: [u8; IV_LEN] = hex::decode(iv_hex).ok()?.try_into().ok()?;
        let ciphertext = hex::decode(ct_hex).ok()?;
        let plaintext = Aes256CbcDec::new(&self.key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .ok()?;
        String::from_utf8(plaintext).ok()
    }
}
