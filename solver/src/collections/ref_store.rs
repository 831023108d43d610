use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A type that can be used as a dense index into a [RefVec].
pub trait Ref: Into<usize> + From<usize> + Copy + PartialEq {}

impl<X> Ref for X where X: Into<usize> + From<usize> + Copy + PartialEq {}

/// Declares a new index type backed by a `NonZeroU32`, so that `Option<$type_name>`
/// fits on 32 bits.
#[macro_export]
macro_rules! create_ref_type {
    ($type_name:ident) => {
        #[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
        pub struct $type_name(std::num::NonZeroU32);

        impl $type_name {
            pub const fn to_u32(self) -> u32 {
                self.0.get() - 1
            }
            pub const fn from_u32(u: u32) -> Self {
                match std::num::NonZeroU32::new(u.wrapping_add(1)) {
                    Some(id) => $type_name(id),
                    None => panic!("index overflow"),
                }
            }
        }
        impl From<usize> for $type_name {
            fn from(u: usize) -> Self {
                Self::from_u32(u as u32)
            }
        }
        impl From<$type_name> for usize {
            fn from(v: $type_name) -> Self {
                v.to_u32() as usize
            }
        }
        impl From<u32> for $type_name {
            fn from(u: u32) -> Self {
                Self::from_u32(u)
            }
        }
        impl From<$type_name> for u32 {
            fn from(v: $type_name) -> Self {
                v.to_u32()
            }
        }
    };
}

/// Vector-backed storage indexed by a typed key.
/// Keys are handed out in insertion order and never invalidated.
#[derive(Clone)]
pub struct RefVec<K, V> {
    values: Vec<V>,
    phantom: PhantomData<K>,
}

impl<K, V> Default for RefVec<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RefVec<K, V> {
    pub fn new() -> Self {
        RefVec {
            values: Vec::new(),
            phantom: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, k: K) -> bool
    where
        K: Ref,
    {
        let index: usize = k.into();
        index < self.len()
    }

    pub fn push(&mut self, value: V) -> K
    where
        K: Ref,
    {
        self.values.push(value);
        K::from(self.values.len() - 1)
    }

    /// Key that the next call to `push` will return.
    pub fn next_key(&self) -> K
    where
        K: Ref,
    {
        K::from(self.values.len())
    }

    /// Extends the vector with generated values until `key` is a valid index.
    pub fn fill_with(&mut self, key: K, value_gen: impl Fn() -> V)
    where
        K: Ref,
    {
        let index: usize = key.into();
        while self.values.len() <= index {
            self.values.push(value_gen());
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = K>
    where
        K: Ref,
    {
        (0..self.values.len()).map(K::from)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.values.iter()
    }

    pub fn entries(&self) -> impl Iterator<Item = (K, &V)>
    where
        K: Ref,
    {
        self.values.iter().enumerate().map(|(i, v)| (K::from(i), v))
    }
}

impl<K: Into<usize>, V> Index<K> for RefVec<K, V> {
    type Output = V;

    fn index(&self, index: K) -> &Self::Output {
        &self.values[index.into()]
    }
}

impl<K: Into<usize>, V> IndexMut<K> for RefVec<K, V> {
    fn index_mut(&mut self, index: K) -> &mut Self::Output {
        &mut self.values[index.into()]
    }
}

impl<K, V: Debug> Debug for RefVec<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    create_ref_type!(Id);

    #[test]
    fn keys_follow_insertion_order() {
        let mut store: RefVec<Id, &str> = RefVec::new();
        assert_eq!(store.next_key().to_u32(), 0);
        let a = store.push("a");
        let b = store.push("b");
        assert_eq!(usize::from(a), 0);
        assert_eq!(usize::from(b), 1);
        assert_eq!(store[b], "b");
        assert!(store.contains(b));
        assert!(!store.contains(Id::from_u32(2)));
        assert_eq!(store.keys().map(Id::to_u32).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn fill_with_extends() {
        let mut store: RefVec<Id, Vec<u8>> = RefVec::new();
        store.fill_with(Id::from_u32(3), Vec::new);
        assert_eq!(store.len(), 4);
        store[Id::from_u32(2)].push(9);
        assert_eq!(store[Id::from_u32(2)], vec![9]);
    }
}
