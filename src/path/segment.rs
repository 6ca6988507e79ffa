/// Segment command kinds, in OpenVG opcode order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    ClosePath,
    MoveTo,
    LineTo,
    HLineTo,
    VLineTo,
    QuadTo,
    CubicTo,
    SmoothQuadTo,
    SmoothCubicTo,
    SmallCCWArcTo,
    SmallCWArcTo,
    LargeCCWArcTo,
    LargeCWArcTo,
}

impl SegmentKind {
    /// Number of coordinates the segment consumes from the coordinate stream.
    pub const fn arity(self) -> usize {
        match self {
            SegmentKind::ClosePath => 0,
            SegmentKind::MoveTo | SegmentKind::LineTo => 2,
            SegmentKind::HLineTo | SegmentKind::VLineTo => 1,
            SegmentKind::QuadTo => 4,
            SegmentKind::CubicTo => 6,
            SegmentKind::SmoothQuadTo => 2,
            SegmentKind::SmoothCubicTo => 4,
            SegmentKind::SmallCCWArcTo
            | SegmentKind::SmallCWArcTo
            | SegmentKind::LargeCCWArcTo
            | SegmentKind::LargeCWArcTo => 5,
        }
    }

    const fn code(self) -> u8 {
        match self {
            SegmentKind::ClosePath => 0,
            SegmentKind::MoveTo => 1,
            SegmentKind::LineTo => 2,
            SegmentKind::HLineTo => 3,
            SegmentKind::VLineTo => 4,
            SegmentKind::QuadTo => 5,
            SegmentKind::CubicTo => 6,
            SegmentKind::SmoothQuadTo => 7,
            SegmentKind::SmoothCubicTo => 8,
            SegmentKind::SmallCCWArcTo => 9,
            SegmentKind::SmallCWArcTo => 10,
            SegmentKind::LargeCCWArcTo => 11,
            SegmentKind::LargeCWArcTo => 12,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        let kind = match code {
            0 => SegmentKind::ClosePath,
            1 => SegmentKind::MoveTo,
            2 => SegmentKind::LineTo,
            3 => SegmentKind::HLineTo,
            4 => SegmentKind::VLineTo,
            5 => SegmentKind::QuadTo,
            6 => SegmentKind::CubicTo,
            7 => SegmentKind::SmoothQuadTo,
            8 => SegmentKind::SmoothCubicTo,
            9 => SegmentKind::SmallCCWArcTo,
            10 => SegmentKind::SmallCWArcTo,
            11 => SegmentKind::LargeCCWArcTo,
            12 => SegmentKind::LargeCWArcTo,
            _ => return None,
        };
        Some(kind)
    }
}

/// One path command plus its absolute/relative flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub kind: SegmentKind,
    pub relative: bool,
}

impl PathSegment {
    pub const fn abs(kind: SegmentKind) -> Self {
        Self { kind, relative: false }
    }

    pub const fn rel(kind: SegmentKind) -> Self {
        Self { kind, relative: true }
    }

    pub const fn arity(self) -> usize {
        self.kind.arity()
    }

    /// OpenVG byte encoding: `kind << 1 | relative`.
    pub const fn opcode(self) -> u8 {
        (self.kind.code() << 1) | (self.relative as u8)
    }

    pub fn from_opcode(op: u8) -> Option<Self> {
        let kind = SegmentKind::from_code(op >> 1)?;
        Some(Self { kind, relative: op & 1 == 1 })
    }
}

/// Total coordinate count a segment list consumes.
pub fn coordinate_count(segments: &[PathSegment]) -> usize {
    segments.iter().map(|s| s.arity()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcodes_decode_back() {
        for op in 0u8..26 {
            let seg = PathSegment::from_opcode(op).unwrap();
            assert_eq!(seg.opcode(), op);
        }
        assert!(PathSegment::from_opcode(26).is_none());
        assert!(PathSegment::from_opcode(0xff).is_none());
    }

    #[test]
    fn arity_table() {
        use SegmentKind::*;
        let kinds = [
            ClosePath, MoveTo, LineTo, HLineTo, VLineTo, QuadTo, CubicTo, SmoothCubicTo,
            SmallCCWArcTo, SmallCWArcTo, LargeCCWArcTo, LargeCWArcTo,
        ];
        let arities: Vec<usize> = kinds.iter().map(|k| k.arity()).collect();
        assert_eq!(arities, vec![0, 2, 2, 1, 1, 4, 6, 4, 5, 5, 5, 5]);
    }
}
