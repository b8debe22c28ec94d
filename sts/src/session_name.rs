use rand::Rng;

pub const SESSION_NAME_LENGTH: usize = 16;
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random role session name of uppercase ASCII letters and digits.
pub fn random_session_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SESSION_NAME_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}
