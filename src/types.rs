use std::fmt::Display;

/// A single column value as stored in relations: a fixed-width machine word.
/// Numeric columns hold the value itself (unsigned and float payloads are
/// bit-cast, see the conversion helpers below), symbol columns hold the id
/// assigned by the relation's symbol table.
pub type DomainValue = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Signed,
    Unsigned,
    Float,
    Symbol
}

impl AttributeKind {
    /// One-character code used in attribute descriptors and signatures.
    pub fn code(&self) -> char {
        match self {
            AttributeKind::Signed => 'i',
            AttributeKind::Unsigned => 'u',
            AttributeKind::Float => 'f',
            AttributeKind::Symbol => 's'
        }
    }

    pub fn from_code(code: char) -> Option<AttributeKind> {
        match code {
            'i' => Some(AttributeKind::Signed),
            'u' => Some(AttributeKind::Unsigned),
            'f' => Some(AttributeKind::Float),
            's' => Some(AttributeKind::Symbol),
            _ => None
        }
    }

    /// Whether a plain number may be written into a column of this kind.
    /// The tuple cursor distinguishes only numbers and symbols; the finer
    /// signed/unsigned/float split matters for rendering and bit-casts.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, AttributeKind::Symbol)
    }
}

impl Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

pub fn domain_from_unsigned(value: u32) -> DomainValue {
    value as DomainValue
}

pub fn unsigned_from_domain(value: DomainValue) -> u32 {
    value as u32
}

pub fn domain_from_float(value: f32) -> DomainValue {
    value.to_bits() as DomainValue
}

pub fn float_from_domain(value: DomainValue) -> f32 {
    f32::from_bits(value as u32)
}
