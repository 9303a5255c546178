//! Declared types, their methods, and annotations.

use std::fmt;
use std::sync::Arc;

use super::capability::{CanBeStatic, HasEnclosingType};
use super::code::{Block, LocalId, ParamId, Stmt, VarSlot};
use super::field::{Disposition, Field};
use super::types::{PrimitiveType, Ty, TypeRef};
use super::variable::{Local, Parameter, VariableDecl};
use crate::span::SourceInfo;

/// Index of a declared type in its [`Program`](super::Program).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

/// Lookup handle for a field: owning type plus position in its field list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId {
    pub owner: TypeId,
    pub index: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId {
    pub owner: TypeId,
    pub index: u32,
}

/// Name of the synthetic static initializer, always method 0.
pub const STATIC_INITIALIZER: &str = "$clinit";
/// Name of the synthetic instance initializer, always method 1.
pub const INSTANCE_INITIALIZER: &str = "$init";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
        }
    }
}

/// A source annotation. Annotations are never mutated in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub info: SourceInfo,
    pub name: Arc<str>,
}

impl Annotation {
    pub fn new(info: SourceInfo, name: &str) -> Self {
        Self {
            info,
            name: Arc::from(name),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)
    }
}

/// Immutable, order-preserving annotation list.
///
/// Cloning shares the list. A pass changes annotations only by swapping in
/// a whole new list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotations(Arc<[Annotation]>);

impl Default for Annotations {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Annotations {
    pub fn new(annotations: Vec<Annotation>) -> Self {
        Self(Arc::from(annotations))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when both lists are the same allocation.
    pub fn ptr_eq(&self, other: &Annotations) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|a| &*a.name == name)
    }
}

impl<'a> IntoIterator for &'a Annotations {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A method of a declared type.
#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    pub(crate) info: SourceInfo,
    pub(crate) name: String,
    pub(crate) enclosing_type: TypeId,
    pub(crate) is_static: bool,
    pub(crate) return_ty: TypeRef,
    pub(crate) params: Vec<Parameter>,
    pub(crate) locals: Vec<Local>,
    pub(crate) body: Option<Block>,
    pub(crate) annotations: Annotations,
}

impl Method {
    pub fn new(
        info: SourceInfo,
        name: impl Into<String>,
        enclosing_type: TypeId,
        is_static: bool,
        return_ty: TypeRef,
    ) -> Self {
        Self {
            info,
            name: name.into(),
            enclosing_type,
            is_static,
            return_ty,
            params: Vec::new(),
            locals: Vec::new(),
            body: None,
            annotations: Annotations::default(),
        }
    }

    pub fn info(&self) -> &SourceInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_ty(&self) -> &TypeRef {
        &self.return_ty
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn locals(&self) -> &[Local] {
        &self.locals
    }

    pub fn param(&self, id: ParamId) -> Option<&Parameter> {
        self.params.get(id.0 as usize)
    }

    pub fn local(&self, id: LocalId) -> Option<&Local> {
        self.locals.get(id.0 as usize)
    }

    pub fn local_mut(&mut self, id: LocalId) -> Option<&mut Local> {
        self.locals.get_mut(id.0 as usize)
    }

    pub fn add_param(&mut self, param: Parameter) -> ParamId {
        self.params.push(param);
        ParamId(self.params.len() as u32 - 1)
    }

    /// Register a local. The caller places its `Stmt::Declare` anchor.
    pub fn add_local(&mut self, local: Local) -> LocalId {
        self.locals.push(local);
        LocalId(self.locals.len() as u32 - 1)
    }

    pub fn body(&self) -> Option<&Block> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut Block> {
        self.body.as_mut()
    }

    pub fn set_body(&mut self, body: Block) {
        self.body = Some(body);
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn is_initializer(&self) -> bool {
        self.name == STATIC_INITIALIZER || self.name == INSTANCE_INITIALIZER
    }
}

impl CanBeStatic for Method {
    fn is_static(&self) -> bool {
        self.is_static
    }
}

impl HasEnclosingType for Method {
    fn enclosing_type(&self) -> Option<TypeId> {
        Some(self.enclosing_type)
    }
}

/// A class or interface. Owns its fields and methods.
#[derive(Clone, Debug, PartialEq)]
pub struct DeclaredType {
    pub(crate) info: SourceInfo,
    pub(crate) id: TypeId,
    pub(crate) name: String,
    pub(crate) kind: TypeKind,
    pub(crate) enclosing_type: Option<TypeId>,
    pub(crate) fields: Vec<Field>,
    pub(crate) methods: Vec<Method>,
    pub(crate) annotations: Annotations,
}

impl DeclaredType {
    /// Create a type with empty static and instance initializers.
    pub fn new(
        info: SourceInfo,
        id: TypeId,
        name: impl Into<String>,
        kind: TypeKind,
        enclosing_type: Option<TypeId>,
    ) -> Self {
        let void = Ty::primitive(PrimitiveType::Void);
        let mut clinit = Method::new(info.clone(), STATIC_INITIALIZER, id, true, void.clone());
        clinit.set_body(Block::new(info.clone(), Vec::new()));
        let mut init = Method::new(info.clone(), INSTANCE_INITIALIZER, id, false, void);
        init.set_body(Block::new(info.clone(), Vec::new()));
        Self {
            info,
            id,
            name: name.into(),
            kind,
            enclosing_type,
            fields: Vec::new(),
            methods: vec![clinit, init],
            annotations: Annotations::default(),
        }
    }

    pub fn info(&self) -> &SourceInfo {
        &self.info
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// A shared type descriptor naming this type.
    pub fn as_type_ref(&self) -> TypeRef {
        Ty::declared(self.id, &self.name)
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn set_annotations(&mut self, annotations: Annotations) {
        self.annotations = annotations;
    }

    /// Declare a field and anchor its declaration statement at the end of
    /// the matching initializer (static or instance).
    pub fn add_field(
        &mut self,
        info: SourceInfo,
        name: impl Into<String>,
        ty: TypeRef,
        is_static: bool,
        disposition: Disposition,
    ) -> FieldId {
        let field = Field::new(info, name, self.id, ty, is_static, disposition);
        self.push_field(field)
    }

    /// Insert an already-built field owned by this type.
    pub fn push_field(&mut self, field: Field) -> FieldId {
        debug_assert_eq!(field.enclosing_type(), self.id);
        let id = FieldId {
            owner: self.id,
            index: self.fields.len() as u32,
        };
        let anchor = Stmt::declare(field.info().clone(), VarSlot::Field(id));
        let initializer = if field.is_static() { 0 } else { 1 };
        if let Some(body) = self.methods[initializer].body_mut() {
            body.stmts.push(anchor);
        }
        self.fields.push(field);
        id
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        if id.owner != self.id {
            return None;
        }
        self.fields.get(id.index as usize)
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        if id.owner != self.id {
            return None;
        }
        self.fields.get_mut(id.index as usize)
    }

    pub fn field_by_name(&self, name: &str) -> Option<FieldId> {
        self.fields
            .iter()
            .position(|f| f.name() == name)
            .map(|index| FieldId {
                owner: self.id,
                index: index as u32,
            })
    }

    pub fn add_method(
        &mut self,
        info: SourceInfo,
        name: impl Into<String>,
        is_static: bool,
        return_ty: TypeRef,
    ) -> MethodId {
        self.methods
            .push(Method::new(info, name, self.id, is_static, return_ty));
        MethodId {
            owner: self.id,
            index: self.methods.len() as u32 - 1,
        }
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn method(&self, id: MethodId) -> Option<&Method> {
        if id.owner != self.id {
            return None;
        }
        self.methods.get(id.index as usize)
    }

    pub fn method_mut(&mut self, id: MethodId) -> Option<&mut Method> {
        if id.owner != self.id {
            return None;
        }
        self.methods.get_mut(id.index as usize)
    }

    pub fn static_initializer(&self) -> &Method {
        &self.methods[0]
    }

    pub fn instance_initializer(&self) -> &Method {
        &self.methods[1]
    }
}

impl HasEnclosingType for DeclaredType {
    fn enclosing_type(&self) -> Option<TypeId> {
        self.enclosing_type
    }
}
