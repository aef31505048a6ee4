//! Segment mask encoding.
//!
//! Character shapes are not listed as opaque constants. Each one is the
//! bitwise OR of already defined shapes plus whatever raw segment bits are
//! still missing, mirroring how the shapes relate on the glass. The build
//! walks from simple shapes to composed ones, so every reference points
//! strictly backwards and is asserted to exist.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::mappings::SegmentBits;

/// Mask of the seven shape bits. Bit 7 drives the colon/dot LEDs and never
/// belongs to a character shape.
const SHAPE_BITS: u8 = 0b0111_1111;

/// Which physical segment sits on which bit of a display register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLayout {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub f: u8,
    pub g: u8,
}

impl SegmentLayout {
    /// The common TM1637 module wiring, segment A on bit 0 through
    /// segment G on bit 6.
    pub const fn standard() -> Self {
        Self {
            a: SegmentBits::SegA as u8,
            b: SegmentBits::SegB as u8,
            c: SegmentBits::SegC as u8,
            d: SegmentBits::SegD as u8,
            e: SegmentBits::SegE as u8,
            f: SegmentBits::SegF as u8,
            g: SegmentBits::SegG as u8,
        }
    }

    fn bits(&self) -> [u8; 7] {
        [self.a, self.b, self.c, self.d, self.e, self.f, self.g]
    }

    /// Panics unless the layout assigns seven distinct single bits within
    /// the low seven positions.
    fn assert_valid(&self) {
        let bits = self.bits();
        let mut seen = 0_u8;

        for &bit in bits.iter() {
            assert!(
                bit.is_power_of_two() && bit & SHAPE_BITS == bit,
                "segment bit {:#04x} is not one of the low seven bits",
                bit
            );
            assert_eq!(seen & bit, 0, "segment bit {:#04x} is assigned twice", bit);
            seen |= bit;
        }
    }
}

/// Collects character definitions while enforcing the build discipline:
/// no duplicates, no stray bits, and compositions may only reach entries
/// that already exist.
struct TableBuilder {
    entries: HashMap<char, u8>,
}

impl TableBuilder {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers a shape. Panics on a duplicate definition or on a mask
    /// that strays outside the seven shape bits.
    fn define(&mut self, ch: char, mask: u8) {
        assert_eq!(
            mask & !SHAPE_BITS,
            0,
            "mask for {:?} uses non-shape bits",
            ch
        );
        assert!(
            self.entries.insert(ch, mask).is_none(),
            "{:?} is defined twice",
            ch
        );
    }

    /// Mask of an already defined entry, for composing further shapes.
    /// Panics when the entry does not exist yet: definitions must stay in
    /// dependency order.
    fn mask(&self, ch: char) -> u8 {
        match self.entries.get(&ch) {
            Some(mask) => *mask,
            None => panic!("{:?} is referenced before it is defined", ch),
        }
    }

    /// Registers `ch` to render exactly like the existing entry `of`.
    fn alias(&mut self, ch: char, of: char) {
        let mask = self.mask(of);
        self.define(ch, mask);
    }

    fn finish(self) -> HashMap<char, u8> {
        self.entries
    }
}

/// Immutable mapping from displayable characters to segment masks.
///
/// Covers the digits, the letters A to Z (uppercase only), space and a
/// few symbols. Some letters share a shape on seven segments, so the
/// mapping is intentionally not injective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterTable {
    entries: HashMap<char, u8>,
}

lazy_static! {
    static ref STANDARD_TABLE: CharacterTable = CharacterTable::build(&SegmentLayout::standard());
}

impl CharacterTable {
    /// The table for the standard wiring, built once on first use.
    pub fn standard() -> &'static Self {
        &STANDARD_TABLE
    }

    /// Builds the table for the given wiring. Pure and deterministic; the
    /// same layout always yields the same table.
    pub fn build(layout: &SegmentLayout) -> Self {
        layout.assert_valid();

        let lay = layout;
        let mut t = TableBuilder::new();

        // blank and the one-segment shapes
        t.define(' ', 0);
        t.define('-', lay.g);
        t.define('_', lay.d);

        // two segments
        t.define('1', lay.b | lay.c);
        t.define('I', lay.e | lay.f);
        t.define('R', lay.e | lay.g);

        // three segments
        t.define('7', t.mask('1') | lay.a);
        t.define('J', t.mask('1') | lay.d);
        t.define('K', t.mask('I') | lay.g);
        t.define('L', t.mask('I') | lay.d);
        t.define('N', t.mask('R') | lay.c);
        t.define('V', lay.c | lay.d | lay.e);
        t.define('X', lay.a | lay.d | lay.g);

        // the Γ shape is shared by 'F' below but is not itself displayable
        let gamma = t.mask('I') | lay.a;

        // four segments
        t.define('4', t.mask('1') | lay.f | lay.g);
        t.define('C', t.mask('L') | lay.a);
        t.define('F', gamma | lay.g);
        t.define('M', t.mask('N') | lay.a);
        t.define('O', t.mask('N') | lay.d);
        t.define('T', t.mask('L') | lay.g);
        t.define('W', lay.b | lay.d | lay.f | lay.g);
        t.define('Y', t.mask('1') | lay.f | lay.g); // same shape as '4'
        t.define('?', lay.a | lay.b | lay.e | lay.g);
        t.define('°', lay.a | lay.b | lay.f | lay.g);

        // five segments
        t.define('2', t.mask('?') | lay.d);
        t.define('3', t.mask('J') | lay.a | lay.g);
        t.define('5', lay.a | lay.c | lay.d | lay.f | lay.g);
        t.define('B', t.mask('O') | lay.f);
        t.define('D', t.mask('O') | lay.b);
        t.define('E', t.mask('C') | lay.g);
        t.define('G', t.mask('C') | lay.c);
        t.define('H', t.mask('1') | t.mask('I') | lay.g);
        t.define('P', t.mask('F') | lay.b);
        t.define('Q', t.mask('°') | lay.c);
        t.define('U', t.mask('V') | lay.b | lay.f);
        t.define('@', t.mask('C') | lay.b);

        // six segments
        t.define('0', t.mask('C') | t.mask('1'));
        t.define('6', t.mask('B') | lay.a);
        t.define('9', t.mask('°') | lay.c | lay.d);
        t.define('A', t.mask('Q') | lay.e);

        // all seven
        t.define('8', t.mask('0') | lay.g);

        // render-alike aliases
        t.alias('S', '5');
        t.alias('Z', '2');

        Self {
            entries: t.finish(),
        }
    }

    /// Segment mask for `ch`, or `None` when the character has no shape.
    pub fn lookup(&self, ch: char) -> Option<u8> {
        self.entries.get(&ch).copied()
    }

    pub fn contains(&self, ch: char) -> bool {
        self.entries.contains_key(&ch)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All `(character, mask)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (char, u8)> + '_ {
        self.entries.iter().map(|(ch, mask)| (*ch, *mask))
    }
}
