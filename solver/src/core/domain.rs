use crate::backtrack::Stamp;
use crate::core::{cst_int_to_long, IntCst, LongCst, NEG_INF, POS_INF};
use crate::model::ModelError;
use env_param::EnvParam;
use itertools::Itertools;
use smallvec::{smallvec, SmallVec};
use std::fmt::{Debug, Display, Formatter};

/// Widest range of values for which a domain accepts to materialize its bitset.
/// Domains that are wider can only be reduced from their bounds.
pub static MAX_BITSET_WIDTH: EnvParam<u32> = EnvParam::new("FDSOLVE_MAX_BITSET_WIDTH", "16777216");

type Word = u64;
const WORD_BITS: usize = Word::BITS as usize;

/// Returned by a removal that would leave a domain without any value.
/// The domain is left untouched.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EmptyDomain;

/// Set of integer values of a variable.
///
/// The domain is represented by its bounds and, once it has a hole, by a bitset whose first bit
/// stands for `origin`. As long as the domain has no hole (see [`Domain::is_continuous`]), the
/// bitset is not allocated and all queries are answered from the bounds alone.
///
/// Bits outside of `[min, max]` are meaningless: shrinking a bound never clears them.
///
/// A domain is never empty. Removals that would empty it are either a programmer error
/// ([`Domain::remove`] on the last value) or rejected without effect ([`Domain::remove_range`]).
#[derive(Clone)]
pub struct Domain {
    origin: IntCst,
    min: IntCst,
    max: IntCst,
    /// Number of bits of the bitset, 0 if it is not materialized.
    num_bits: usize,
    /// Number of values in the domain.
    size: u64,
    words: SmallVec<[Word; 2]>,
    /// Save point at which the last snapshot of this domain was recorded.
    pub(crate) last_saved: Stamp,
}

/// Number of values in `[lb, ub]`.
fn width(lb: IntCst, ub: IntCst) -> u64 {
    (cst_int_to_long(ub) - cst_int_to_long(lb) + 1) as u64
}

/// Mask selecting the bits `[from, to]` of a word.
fn mask(from: usize, to: usize) -> Word {
    debug_assert!(from <= to && to < WORD_BITS);
    (!0 << from) & (!0 >> (WORD_BITS - 1 - to))
}

/// Words covering the bits `[from, to]`, each with the mask of the relevant bits.
fn spans(from: usize, to: usize) -> impl DoubleEndedIterator<Item = (usize, Word)> {
    let (first, last) = (from / WORD_BITS, to / WORD_BITS);
    (first..=last).map(move |w| {
        let lo = if w == first { from % WORD_BITS } else { 0 };
        let hi = if w == last { to % WORD_BITS } else { WORD_BITS - 1 };
        (w, mask(lo, hi))
    })
}

impl Domain {
    /// Creates the domain `[lb, ub]`.
    ///
    /// # Panics
    /// If the range is empty or touches one of the infinity sentinels.
    pub fn new(lb: IntCst, ub: IntCst) -> Domain {
        match Self::try_new(lb, ub) {
            Ok(dom) => dom,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_new(lb: IntCst, ub: IntCst) -> Result<Domain, ModelError> {
        if lb <= NEG_INF {
            return Err(ModelError::ReservedValue(lb));
        }
        if ub >= POS_INF {
            return Err(ModelError::ReservedValue(ub));
        }
        if lb > ub {
            return Err(ModelError::EmptyRange(lb, ub));
        }
        Ok(Domain {
            origin: lb,
            min: lb,
            max: ub,
            num_bits: 0,
            size: width(lb, ub),
            words: SmallVec::new(),
            last_saved: Stamp::ROOT,
        })
    }

    pub fn singleton(value: IntCst) -> Domain {
        Self::new(value, value)
    }

    pub fn min(&self) -> IntCst {
        self.min
    }

    pub fn max(&self) -> IntCst {
        self.max
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_bound(&self) -> bool {
        self.size == 1
    }

    /// The only value of the domain, if it is bound.
    pub fn value(&self) -> Option<IntCst> {
        self.is_bound().then_some(self.min)
    }

    /// True if the domain has no hole, i.e. it is exactly `[min, max]`.
    pub fn is_continuous(&self) -> bool {
        self.size == width(self.min, self.max)
    }

    pub fn contains(&self, value: IntCst) -> bool {
        if value < self.min || value > self.max {
            false
        } else if self.is_continuous() {
            true
        } else {
            self.test_bit(value)
        }
    }

    /// Smallest value of the domain strictly greater than `value`, or [POS_INF] if there is none.
    pub fn next(&self, value: IntCst) -> IntCst {
        if value < self.min {
            self.min
        } else if value >= self.max {
            POS_INF
        } else {
            self.first_in(value + 1, self.max)
        }
    }

    /// Largest value of the domain strictly smaller than `value`, or [NEG_INF] if there is none.
    pub fn previous(&self, value: IntCst) -> IntCst {
        if value > self.max {
            self.max
        } else if value <= self.min {
            NEG_INF
        } else {
            self.last_in(self.min, value - 1)
        }
    }

    /// Smallest value strictly greater than `value` that is *not* in the domain.
    ///
    /// Values outside of `[min, max]` are not in the domain: for any value of the last interval,
    /// the result is `max + 1`. Saturates at [POS_INF].
    pub fn next_gap(&self, value: IntCst) -> IntCst {
        if value >= POS_INF - 1 {
            return POS_INF;
        }
        let candidate = value + 1;
        if candidate < self.min || candidate > self.max {
            candidate
        } else {
            self.first_absent_in(candidate, self.max)
        }
    }

    /// Iterates over the values of the domain in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = IntCst> + '_ {
        std::iter::successors(Some(self.min), move |&v| {
            let next = self.next(v);
            (next != POS_INF).then_some(next)
        })
    }

    /// Iterates over the maximal intervals `[lo, hi]` of the domain, in increasing order.
    pub fn intervals(&self) -> impl Iterator<Item = (IntCst, IntCst)> + '_ {
        let first = (self.min, self.next_gap(self.min) - 1);
        std::iter::successors(Some(first), move |&(_, hi)| {
            let lo = self.next(hi);
            (lo != POS_INF).then(|| (lo, self.next_gap(lo) - 1))
        })
    }

    /// Removes `value` from the domain. Returns true if it was present.
    ///
    /// # Panics
    /// If `value` is the only value of the domain: callers must detect this case and report a
    /// failure instead.
    pub fn remove(&mut self, value: IntCst) -> bool {
        if !self.contains(value) {
            return false;
        }
        assert!(self.size > 1, "removal of {value}, the last value of a domain");
        if value == self.min {
            self.min = self.first_in(value + 1, self.max);
        } else if value == self.max {
            self.max = self.last_in(self.min, value - 1);
        } else {
            self.ensure_bits();
            let bit = self.bit_index(value);
            self.words[bit / WORD_BITS] &= !(1 << (bit % WORD_BITS));
        }
        self.size -= 1;
        true
    }

    /// Removes all values of `[lo, hi]` from the domain. Returns true if at least one value was removed.
    ///
    /// If the domain would become empty, [EmptyDomain] is returned and the domain is unchanged.
    pub fn remove_range(&mut self, lo: IntCst, hi: IntCst) -> Result<bool, EmptyDomain> {
        let lo = lo.max(self.min);
        let hi = hi.min(self.max);
        if lo > hi {
            return Ok(false);
        }
        let removed = self.count_in(lo, hi);
        if removed == 0 {
            return Ok(false);
        }
        if removed == self.size {
            return Err(EmptyDomain);
        }
        if lo == self.min {
            self.min = self.first_in(hi + 1, self.max);
        } else if hi == self.max {
            self.max = self.last_in(self.min, lo - 1);
        } else {
            self.ensure_bits();
            let (from, to) = (self.bit_index(lo), self.bit_index(hi));
            for (w, m) in spans(from, to) {
                self.words[w] &= !m;
            }
        }
        self.size -= removed;
        Ok(true)
    }

    fn bit_index(&self, value: IntCst) -> usize {
        debug_assert!(self.num_bits > 0 && value >= self.origin);
        (cst_int_to_long(value) - cst_int_to_long(self.origin)) as usize
    }

    fn value_at(&self, bit: usize) -> IntCst {
        (cst_int_to_long(self.origin) + bit as LongCst) as IntCst
    }

    fn test_bit(&self, value: IntCst) -> bool {
        let bit = self.bit_index(value);
        (self.words[bit / WORD_BITS] >> (bit % WORD_BITS)) & 1 == 1
    }

    /// First value of the domain in `[lo, hi]` (a sub-range of `[min, max]`), [POS_INF] if none.
    fn first_in(&self, lo: IntCst, hi: IntCst) -> IntCst {
        if self.is_continuous() {
            return lo;
        }
        for (w, m) in spans(self.bit_index(lo), self.bit_index(hi)) {
            let set = self.words[w] & m;
            if set != 0 {
                return self.value_at(w * WORD_BITS + set.trailing_zeros() as usize);
            }
        }
        POS_INF
    }

    /// Last value of the domain in `[lo, hi]` (a sub-range of `[min, max]`), [NEG_INF] if none.
    fn last_in(&self, lo: IntCst, hi: IntCst) -> IntCst {
        if self.is_continuous() {
            return hi;
        }
        for (w, m) in spans(self.bit_index(lo), self.bit_index(hi)).rev() {
            let set = self.words[w] & m;
            if set != 0 {
                return self.value_at(w * WORD_BITS + (WORD_BITS - 1 - set.leading_zeros() as usize));
            }
        }
        NEG_INF
    }

    /// First value of `[lo, hi]` (a sub-range of `[min, max]`) that is not in the domain, `hi + 1` if none.
    fn first_absent_in(&self, lo: IntCst, hi: IntCst) -> IntCst {
        if self.is_continuous() {
            return hi + 1;
        }
        for (w, m) in spans(self.bit_index(lo), self.bit_index(hi)) {
            let unset = !self.words[w] & m;
            if unset != 0 {
                return self.value_at(w * WORD_BITS + unset.trailing_zeros() as usize);
            }
        }
        hi + 1
    }

    /// Number of values of the domain in `[lo, hi]` (a sub-range of `[min, max]`).
    fn count_in(&self, lo: IntCst, hi: IntCst) -> u64 {
        if self.is_continuous() {
            return width(lo, hi);
        }
        spans(self.bit_index(lo), self.bit_index(hi))
            .map(|(w, m)| (self.words[w] & m).count_ones() as u64)
            .sum()
    }

    /// Allocates the bitset, covering the current `[min, max]`, if not already done.
    ///
    /// # Panics
    /// If the domain is wider than [MAX_BITSET_WIDTH].
    fn ensure_bits(&mut self) {
        if self.num_bits > 0 {
            return;
        }
        debug_assert!(self.is_continuous());
        let limit = MAX_BITSET_WIDTH.get();
        if self.size > limit as u64 {
            panic!("{}", ModelError::TooWide(self.size, limit));
        }
        let num_bits = self.size as usize;
        self.origin = self.min;
        self.words = smallvec![!0; num_bits.div_ceil(WORD_BITS)];
        self.num_bits = num_bits;
    }
}

impl PartialEq for Domain {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.min == other.min && self.max == other.max && self.iter().eq(other.iter())
    }
}

impl Eq for Domain {}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(v) = self.value() {
            return write!(f, "{v}");
        }
        let intervals = self.intervals().format_with(", ", |(lo, hi), emit| {
            if lo == hi {
                emit(&lo)
            } else {
                emit(&format_args!("{lo}..{hi}"))
            }
        });
        write!(f, "[{intervals}]")
    }
}

impl Debug for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}
