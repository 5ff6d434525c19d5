//! Anti-forgery tokens
//!
//! A token is an HMAC-SHA256 over the action, the acting principal and a time
//! tick. A tick is half the token lifetime long and tokens from the current
//! and the previous tick are accepted, so a token stays valid for between one
//! half and one full lifetime.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::RngExt;
use sha2::Sha256;
use std::time::Duration;

use crate::prelude::*;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(86_400);
const TAG_LENGTH: usize = 12;
const SECRET_LENGTH: usize = 48;
const SAFE: [char; 62] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
	'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
	'V', 'W', 'X', 'Y', 'Z',
];

/// Random secret for deployments that did not configure one
pub fn random_secret() -> String {
	let mut rng = rand::rng();
	let mut result = String::with_capacity(SECRET_LENGTH);
	for _ in 0..SECRET_LENGTH {
		result.push(SAFE[rng.random_range(0..SAFE.len())]);
	}
	result
}

#[derive(Clone)]
pub struct NonceService {
	secret: Box<[u8]>,
	half_life: i64,
}

impl std::fmt::Debug for NonceService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NonceService").field("half_life", &self.half_life).finish_non_exhaustive()
	}
}

impl NonceService {
	pub fn new(secret: &[u8], lifetime: Duration) -> Self {
		let half_life = i64::try_from(lifetime.as_secs() / 2).unwrap_or(i64::MAX).max(1);
		Self { secret: secret.into(), half_life }
	}

	pub fn create(&self, action: &str, principal: &str) -> ClResult<String> {
		self.create_at(action, principal, chrono::Utc::now().timestamp())
	}

	pub fn create_at(&self, action: &str, principal: &str, now: i64) -> ClResult<String> {
		let tag = self.mac(self.tick(now), action, principal)?.finalize().into_bytes();
		Ok(URL_SAFE_NO_PAD.encode(&tag[..TAG_LENGTH]))
	}

	pub fn verify(&self, token: &str, action: &str, principal: &str) -> bool {
		self.verify_at(token, action, principal, chrono::Utc::now().timestamp())
	}

	pub fn verify_at(&self, token: &str, action: &str, principal: &str, now: i64) -> bool {
		let Ok(tag) = URL_SAFE_NO_PAD.decode(token.as_bytes()) else {
			return false;
		};
		if tag.len() != TAG_LENGTH {
			return false;
		}
		let tick = self.tick(now);
		[tick, tick - 1].into_iter().any(|t| {
			self.mac(t, action, principal).is_ok_and(|mac| mac.verify_truncated_left(&tag).is_ok())
		})
	}

	fn tick(&self, now: i64) -> i64 {
		now.div_euclid(self.half_life) + 1
	}

	fn mac(&self, tick: i64, action: &str, principal: &str) -> ClResult<HmacSha256> {
		let mut mac = HmacSha256::new_from_slice(&self.secret)
			.map_err(|_| Error::Internal("invalid nonce secret".into()))?;
		mac.update(format!("{}|{}|{}", tick, action, principal).as_bytes());
		Ok(mac)
	}
}


// vim: ts=4
