use super::capability::HasEnclosingType;
use super::declared::{DeclaredType, FieldId, MethodId, TypeId, TypeKind};
use super::field::Field;
use super::declared::Method;
use crate::span::SourceInfo;

/// Arena owning every declared type of a compilation.
///
/// Types are never removed, so a [`TypeId`] stays valid for the life of the
/// program. Dropping the program drops every type and, with them, their
/// fields and methods.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    types: Vec<DeclaredType>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_type(
        &mut self,
        info: SourceInfo,
        name: impl Into<String>,
        kind: TypeKind,
        enclosing_type: Option<TypeId>,
    ) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types
            .push(DeclaredType::new(info, id, name, kind, enclosing_type));
        id
    }

    pub fn types(&self) -> &[DeclaredType] {
        &self.types
    }

    /// Disjoint mutable access to every type, for per-type passes.
    pub fn types_mut(&mut self) -> &mut [DeclaredType] {
        &mut self.types
    }

    pub fn ty(&self, id: TypeId) -> Option<&DeclaredType> {
        self.types.get(id.0 as usize)
    }

    pub fn ty_mut(&mut self, id: TypeId) -> Option<&mut DeclaredType> {
        self.types.get_mut(id.0 as usize)
    }

    pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
        self.types.iter().find(|t| t.name() == name).map(|t| t.id())
    }

    /// Types declared directly inside `outer`.
    pub fn nested_types(&self, outer: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.types
            .iter()
            .filter(move |t| t.enclosing_type() == Some(outer))
            .map(|t| t.id())
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.ty(id.owner)?.field(id)
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.ty_mut(id.owner)?.field_mut(id)
    }

    pub fn method(&self, id: MethodId) -> Option<&Method> {
        self.ty(id.owner)?.method(id)
    }

    pub fn method_mut(&mut self, id: MethodId) -> Option<&mut Method> {
        self.ty_mut(id.owner)?.method_mut(id)
    }

    pub fn field_count(&self) -> usize {
        self.types.iter().map(|t| t.fields().len()).sum()
    }
}
