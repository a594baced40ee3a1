//! Payload layout of the QuickDraw opcodes below `0xA2`.
//!
//! The interpreter handles the opcodes marked [`OpData::Special`] itself
//! and skips every other one using the layout recorded here.

/// How to get past an opcode's payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OpData {
    /// Fixed number of payload bytes.
    Fixed(u8),
    /// A length word followed by that many bytes.
    WordLen,
    /// A size word that counts itself (polygons, regions).
    SelfSized,
    /// `prefix` bytes, a count byte, then `count` text bytes.
    Text(u8),
    /// Decoded by the interpreter.
    Special,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct OpInfo {
    pub name: &'static str,
    pub data: OpData,
}

const WORD_LEN: OpData = OpData::WordLen;
const SELF_SIZED: OpData = OpData::SelfSized;
const SPECIAL: OpData = OpData::Special;

const fn fixed(n: u8) -> OpData {
    OpData::Fixed(n)
}

const fn text(prefix: u8) -> OpData {
    OpData::Text(prefix)
}

const fn op(name: &'static str, data: OpData) -> OpInfo {
    OpInfo { name, data }
}

/// First opcode past the table.
pub(crate) const TABLE_END: u16 = 0xA2;

static OPCODES: [OpInfo; TABLE_END as usize] = [
    op("NOP", fixed(0)), // 0x00
    op("Clip", SPECIAL), // 0x01
    op("BkPat", fixed(8)), // 0x02
    op("TxFont", fixed(2)), // 0x03
    op("TxFace", fixed(1)), // 0x04
    op("TxMode", fixed(2)), // 0x05
    op("SpExtra", fixed(4)), // 0x06
    op("PnSize", fixed(4)), // 0x07
    op("PnMode", fixed(2)), // 0x08
    op("PnPat", fixed(8)), // 0x09
    op("FillPat", fixed(8)), // 0x0a
    op("OvSize", fixed(4)), // 0x0b
    op("Origin", fixed(4)), // 0x0c
    op("TxSize", fixed(2)), // 0x0d
    op("FgColor", fixed(4)), // 0x0e
    op("BkColor", fixed(4)), // 0x0f
    op("TxRatio", fixed(8)), // 0x10
    op("Version", fixed(1)), // 0x11
    op("BkPixPat", SPECIAL), // 0x12
    op("PnPixPat", SPECIAL), // 0x13
    op("FillPixPat", SPECIAL), // 0x14
    op("PnLocHFrac", fixed(2)), // 0x15
    op("ChExtra", fixed(2)), // 0x16
    op("reserved", fixed(0)), // 0x17
    op("reserved", fixed(0)), // 0x18
    op("reserved", fixed(0)), // 0x19
    op("RGBFgCol", fixed(6)), // 0x1a
    op("RGBBkCol", fixed(6)), // 0x1b
    op("HiliteMode", fixed(0)), // 0x1c
    op("HiliteColor", fixed(6)), // 0x1d
    op("DefHilite", fixed(0)), // 0x1e
    op("OpColor", fixed(6)), // 0x1f
    op("Line", fixed(8)), // 0x20
    op("LineFrom", fixed(4)), // 0x21
    op("ShortLine", fixed(6)), // 0x22
    op("ShortLineFrom", fixed(2)), // 0x23
    op("reserved", WORD_LEN), // 0x24
    op("reserved", WORD_LEN), // 0x25
    op("reserved", WORD_LEN), // 0x26
    op("reserved", WORD_LEN), // 0x27
    op("LongText", text(4)), // 0x28
    op("DHText", text(1)), // 0x29
    op("DVText", text(1)), // 0x2a
    op("DHDVText", text(2)), // 0x2b
    op("FontName", WORD_LEN), // 0x2c
    op("LineJustify", WORD_LEN), // 0x2d
    op("GlyphState", WORD_LEN), // 0x2e
    op("reserved", WORD_LEN), // 0x2f
    op("frameRect", fixed(8)), // 0x30
    op("paintRect", fixed(8)), // 0x31
    op("eraseRect", fixed(8)), // 0x32
    op("invertRect", fixed(8)), // 0x33
    op("fillRect", fixed(8)), // 0x34
    op("reserved", fixed(8)), // 0x35
    op("reserved", fixed(8)), // 0x36
    op("reserved", fixed(8)), // 0x37
    op("frameSameRect", fixed(0)), // 0x38
    op("paintSameRect", fixed(0)), // 0x39
    op("eraseSameRect", fixed(0)), // 0x3a
    op("invertSameRect", fixed(0)), // 0x3b
    op("fillSameRect", fixed(0)), // 0x3c
    op("reserved", fixed(0)), // 0x3d
    op("reserved", fixed(0)), // 0x3e
    op("reserved", fixed(0)), // 0x3f
    op("frameRRect", fixed(8)), // 0x40
    op("paintRRect", fixed(8)), // 0x41
    op("eraseRRect", fixed(8)), // 0x42
    op("invertRRect", fixed(8)), // 0x43
    op("fillRRect", fixed(8)), // 0x44
    op("reserved", fixed(8)), // 0x45
    op("reserved", fixed(8)), // 0x46
    op("reserved", fixed(8)), // 0x47
    op("frameSameRRect", fixed(0)), // 0x48
    op("paintSameRRect", fixed(0)), // 0x49
    op("eraseSameRRect", fixed(0)), // 0x4a
    op("invertSameRRect", fixed(0)), // 0x4b
    op("fillSameRRect", fixed(0)), // 0x4c
    op("reserved", fixed(0)), // 0x4d
    op("reserved", fixed(0)), // 0x4e
    op("reserved", fixed(0)), // 0x4f
    op("frameOval", fixed(8)), // 0x50
    op("paintOval", fixed(8)), // 0x51
    op("eraseOval", fixed(8)), // 0x52
    op("invertOval", fixed(8)), // 0x53
    op("fillOval", fixed(8)), // 0x54
    op("reserved", fixed(8)), // 0x55
    op("reserved", fixed(8)), // 0x56
    op("reserved", fixed(8)), // 0x57
    op("frameSameOval", fixed(0)), // 0x58
    op("paintSameOval", fixed(0)), // 0x59
    op("eraseSameOval", fixed(0)), // 0x5a
    op("invertSameOval", fixed(0)), // 0x5b
    op("fillSameOval", fixed(0)), // 0x5c
    op("reserved", fixed(0)), // 0x5d
    op("reserved", fixed(0)), // 0x5e
    op("reserved", fixed(0)), // 0x5f
    op("frameArc", fixed(12)), // 0x60
    op("paintArc", fixed(12)), // 0x61
    op("eraseArc", fixed(12)), // 0x62
    op("invertArc", fixed(12)), // 0x63
    op("fillArc", fixed(12)), // 0x64
    op("reserved", fixed(12)), // 0x65
    op("reserved", fixed(12)), // 0x66
    op("reserved", fixed(12)), // 0x67
    op("frameSameArc", fixed(4)), // 0x68
    op("paintSameArc", fixed(4)), // 0x69
    op("eraseSameArc", fixed(4)), // 0x6a
    op("invertSameArc", fixed(4)), // 0x6b
    op("fillSameArc", fixed(4)), // 0x6c
    op("reserved", fixed(4)), // 0x6d
    op("reserved", fixed(4)), // 0x6e
    op("reserved", fixed(4)), // 0x6f
    op("framePoly", SPECIAL), // 0x70
    op("paintPoly", SPECIAL), // 0x71
    op("erasePoly", SPECIAL), // 0x72
    op("invertPoly", SPECIAL), // 0x73
    op("fillPoly", SPECIAL), // 0x74
    op("reserved", SPECIAL), // 0x75
    op("reserved", SPECIAL), // 0x76
    op("reserved", SPECIAL), // 0x77
    op("frameSamePoly", fixed(0)), // 0x78
    op("paintSamePoly", fixed(0)), // 0x79
    op("eraseSamePoly", fixed(0)), // 0x7a
    op("invertSamePoly", fixed(0)), // 0x7b
    op("fillSamePoly", fixed(0)), // 0x7c
    op("reserved", fixed(0)), // 0x7d
    op("reserved", fixed(0)), // 0x7e
    op("reserved", fixed(0)), // 0x7f
    op("frameRgn", SELF_SIZED), // 0x80
    op("paintRgn", SELF_SIZED), // 0x81
    op("eraseRgn", SELF_SIZED), // 0x82
    op("invertRgn", SELF_SIZED), // 0x83
    op("fillRgn", SELF_SIZED), // 0x84
    op("reserved", SELF_SIZED), // 0x85
    op("reserved", SELF_SIZED), // 0x86
    op("reserved", SELF_SIZED), // 0x87
    op("frameSameRgn", fixed(0)), // 0x88
    op("paintSameRgn", fixed(0)), // 0x89
    op("eraseSameRgn", fixed(0)), // 0x8a
    op("invertSameRgn", fixed(0)), // 0x8b
    op("fillSameRgn", fixed(0)), // 0x8c
    op("reserved", fixed(0)), // 0x8d
    op("reserved", fixed(0)), // 0x8e
    op("reserved", fixed(0)), // 0x8f
    op("BitsRect", SPECIAL), // 0x90
    op("BitsRgn", SPECIAL), // 0x91
    op("reserved", WORD_LEN), // 0x92
    op("reserved", WORD_LEN), // 0x93
    op("reserved", WORD_LEN), // 0x94
    op("reserved", WORD_LEN), // 0x95
    op("reserved", WORD_LEN), // 0x96
    op("reserved", WORD_LEN), // 0x97
    op("PackBitsRect", SPECIAL), // 0x98
    op("PackBitsRgn", SPECIAL), // 0x99
    op("DirectBitsRect", SPECIAL), // 0x9a
    op("DirectBitsRgn", SPECIAL), // 0x9b
    op("reserved", WORD_LEN), // 0x9c
    op("reserved", WORD_LEN), // 0x9d
    op("reserved", WORD_LEN), // 0x9e
    op("reserved", WORD_LEN), // 0x9f
    op("ShortComment", fixed(2)), // 0xa0
    op("LongComment", SPECIAL), // 0xa1
];

/// Table entry for `opcode`, if it is below [`TABLE_END`].
pub(crate) fn lookup(opcode: u16) -> Option<&'static OpInfo> {
    OPCODES.get(usize::from(opcode))
}
