use rand::Rng;

pub const REFERENCE_PREFIX: &str = "TRG-";

const SUFFIX_SPAN: u32 = 1_000_000;

/// Produce a human-presentable booking reference: fixed prefix plus a
/// six-digit random suffix. Collisions are possible; the bookings table
/// carries a uniqueness constraint and stores retry generation on conflict.
pub fn generate() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..SUFFIX_SPAN);
    format!("{REFERENCE_PREFIX}{suffix:06}")
}
