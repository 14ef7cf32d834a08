//! Tokenizer-less sequence encoding for the classifier's text branch.

/// Hashes whitespace-separated words into `1..vocab_size` and zero-pads the
/// sequence at the end to exactly `max_len` ids. Id 0 is reserved for padding.
///
/// blake3 keeps ids stable across processes and platforms.
pub fn encode(text: &str, max_len: usize, vocab_size: u32) -> Vec<u32> {
    let mut ids: Vec<u32> = text
        .split_whitespace()
        .take(max_len)
        .map(|word| word_id(word, vocab_size))
        .collect();
    ids.resize(max_len, 0);
    ids
}

fn word_id(word: &str, vocab_size: u32) -> u32 {
    if vocab_size <= 1 {
        return 0;
    }
    let hash = blake3::hash(word.as_bytes());
    let mut head = [0u8; 4];
    head.copy_from_slice(&hash.as_bytes()[..4]);
    1 + u32::from_le_bytes(head) % (vocab_size - 1)
}
