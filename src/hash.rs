use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};

use xxhash_rust::xxh3::Xxh3;

/// Unseeded xxh3, so a key hashes to the same value in every table and run.
pub type DefaultHashBuilder = BuildHasherDefault<Xxh3>;

#[inline]
pub(crate) fn hash_key<Q, S>(build: &S, key: &Q) -> u64
where
    Q: Hash + ?Sized,
    S: BuildHasher,
{
    let mut hasher = build.build_hasher();
    key.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_across_builders() {
        let first = hash_key(&DefaultHashBuilder::default(), "Groucho");
        let second = hash_key(&DefaultHashBuilder::default(), "Groucho");
        assert_eq!(first, second);
    }

    #[test]
    fn owned_and_borrowed_keys_agree() {
        let build = DefaultHashBuilder::default();
        assert_eq!(
            hash_key(&build, &String::from("Harpo")),
            hash_key(&build, "Harpo")
        );
    }

    #[test]
    fn distinct_keys_usually_differ() {
        let build = DefaultHashBuilder::default();
        assert_ne!(hash_key(&build, "Chico"), hash_key(&build, "Zeppo"));
    }
}
