use super::ValueType;

/// The declared shape of a mapped record.
///
/// Shapes are what the convention pipeline discovers properties, keys, and
/// relationships from. They usually come from a derive or a reflection pass
/// over a source type; the core only sees names and types.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    /// Name of the record type. Becomes the entity type name.
    pub name: String,

    /// Members in declaration order
    pub members: Vec<Member>,

    /// Key declared on the record itself (attribute style), if any
    pub key: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemberKind {
    /// A plain value
    Scalar(ValueType),

    /// A single related record of the named type
    Reference(String),

    /// Many related records of the named type
    Collection(String),
}

impl Shape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: vec![],
            key: None,
        }
    }

    pub fn scalar(mut self, name: impl Into<String>, ty: impl Into<ValueType>) -> Self {
        self.members.push(Member {
            name: name.into(),
            kind: MemberKind::Scalar(ty.into()),
        });
        self
    }

    pub fn reference(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.members.push(Member {
            name: name.into(),
            kind: MemberKind::Reference(target.into()),
        });
        self
    }

    pub fn collection(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.members.push(Member {
            name: name.into(),
            kind: MemberKind::Collection(target.into()),
        });
        self
    }

    pub fn key<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.name == name)
    }

    /// Members that navigate to other record types.
    pub fn navigations(&self) -> impl Iterator<Item = &Member> + '_ {
        self.members.iter().filter(|member| member.is_navigation())
    }
}

impl Member {
    pub fn is_navigation(&self) -> bool {
        self.target().is_some()
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, MemberKind::Collection(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.kind, MemberKind::Reference(_))
    }

    /// Name of the related record type, if this member is a navigation.
    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            MemberKind::Scalar(_) => None,
            MemberKind::Reference(target) | MemberKind::Collection(target) => Some(target),
        }
    }
}
