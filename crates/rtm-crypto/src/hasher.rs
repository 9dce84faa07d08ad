use crate::digest::Digest;

/// Domain-separated BLAKE3 content hasher.
///
/// The domain tag is prepended to every hash computation so digests for
/// different purposes never collide, even over identical bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for element fingerprints.
    pub const ELEMENT: Self = Self {
        domain: "rtm-element-v1",
    };

    /// Hash a sequence of fields. Each field is length-prefixed so that
    /// `["ab", "c"]` and `["a", "bc"]` produce different digests.
    pub fn hash_parts<'a, I>(&self, parts: I) -> Digest
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        Digest::from_hash(*hasher.finalize().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let h = ContentHasher::ELEMENT;
        assert_eq!(h.hash_parts([b"hello".as_slice()]), h.hash_parts([b"hello".as_slice()]));
    }

    #[test]
    fn field_boundaries_matter() {
        let h = ContentHasher::ELEMENT;
        let a = h.hash_parts([b"ab".as_slice(), b"c".as_slice()]);
        let b = h.hash_parts([b"a".as_slice(), b"bc".as_slice()]);
        assert_ne!(a, b);
    }

    #[test]
    fn digest_differs_from_undomained_blake3() {
        let raw = Digest::from_hash(*blake3::hash(b"data").as_bytes());
        assert_ne!(ContentHasher::ELEMENT.hash_parts([b"data".as_slice()]), raw);
    }
}
