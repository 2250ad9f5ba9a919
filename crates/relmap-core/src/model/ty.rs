use std::fmt;

/// Scalar value types a property can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    Bool,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    String,
    Bytes,
    Uuid,
    Date,
    DateTime,
}

/// The declared type of a property: a scalar type and whether the declared
/// shape admits null (`Option<T>` on the source record).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueType {
    pub ty: Type,
    pub nullable: bool,
}

impl Type {
    /// The nullable form of this type.
    pub const fn nullable(self) -> ValueType {
        ValueType {
            ty: self,
            nullable: true,
        }
    }

    /// The non-nullable form of this type.
    pub const fn required(self) -> ValueType {
        ValueType {
            ty: self,
            nullable: false,
        }
    }
}

impl ValueType {
    pub const fn new(ty: Type, nullable: bool) -> Self {
        Self { ty, nullable }
    }

    pub const fn as_nullable(self) -> Self {
        self.ty.nullable()
    }

    /// Two types are compatible when their scalar types agree, regardless of
    /// nullability.
    pub fn is_compatible(self, other: impl Into<ValueType>) -> bool {
        self.ty == other.into().ty
    }
}

impl From<Type> for ValueType {
    fn from(ty: Type) -> Self {
        ty.required()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "decimal",
            Self::String => "String",
            Self::Bytes => "bytes",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "Option<{}>", self.ty)
        } else {
            fmt::Display::fmt(&self.ty, f)
        }
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
