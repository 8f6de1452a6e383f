//! CPU-side compile + link of a WGSL vertex/fragment pair.
//!
//! Both stages are parsed and validated with naga before any GPU object
//! exists, so every compile or link failure is reported with a readable
//! diagnostic and leaves nothing behind to release.

use std::collections::HashSet;
use std::fmt;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, BuiltIn, Expression, GlobalVariable, Handle, Module, Statement, Type, TypeInner};

use crate::{Error, Result};

use super::UniformLocation;

/// Programmable pipeline stage of a shader source.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// One parsed, not yet validated stage and the source it came from.
struct ParsedStage<'s> {
    stage: ShaderStage,
    source: &'s str,
    module: Module,
}

impl<'s> ParsedStage<'s> {
    fn parse(stage: ShaderStage, source: &'s str) -> Result<Self> {
        let module = naga::front::wgsl::parse_str(source).map_err(|e| Error::ShaderCompile {
            stage,
            diagnostic: e.emit_to_string(source),
        })?;
        Ok(Self { stage, source, module })
    }

    fn validate(&self) -> Result<()> {
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&self.module)
            .map(drop)
            .map_err(|e| Error::ShaderCompile {
                stage: self.stage,
                diagnostic: e.emit_to_string(self.source),
            })
    }
}

/// Vertex source that parsed successfully.
pub(crate) struct VertexSource<'s>(ParsedStage<'s>);

impl<'s> VertexSource<'s> {
    pub(crate) fn parse(source: &'s str) -> Result<Self> {
        ParsedStage::parse(ShaderStage::Vertex, source).map(Self)
    }
}

/// Fragment source that parsed successfully.
pub(crate) struct FragmentSource<'s>(ParsedStage<'s>);

impl<'s> FragmentSource<'s> {
    pub(crate) fn parse(source: &'s str) -> Result<Self> {
        ParsedStage::parse(ShaderStage::Fragment, source).map(Self)
    }
}

/// Two stages whose interfaces were checked against each other.
pub(crate) struct LinkedStages {
    stages: [LinkedStage; 2],
}

struct LinkedStage {
    module: Module,
    entry_point: String,
    /// Globals reachable from the entry point; everything else counts as optimized away.
    live_globals: HashSet<Handle<GlobalVariable>>,
}

impl LinkedStages {
    pub(crate) fn vertex_entry(&self) -> &str {
        &self.stages[0].entry_point
    }

    pub(crate) fn fragment_entry(&self) -> &str {
        &self.stages[1].entry_point
    }

    /// Looks `name` up among the live resource globals of both stages.
    ///
    /// The vertex stage wins when both stages declare the name.
    pub(crate) fn resolve_uniform(&self, name: &str) -> Option<UniformLocation> {
        self.stages.iter().find_map(|stage| {
            stage
                .module
                .global_variables
                .iter()
                .filter(|(handle, _)| stage.live_globals.contains(handle))
                .find(|(_, var)| var.name.as_deref() == Some(name) && is_resource(var.space))
                .and_then(|(_, var)| var.binding.as_ref())
                .map(|rb| UniformLocation {
                    group: rb.group,
                    binding: rb.binding,
                })
        })
    }
}

/// Checks that `vertex` feeds `fragment`, then validates both stages.
///
/// Interface checks run first, on the parsed modules, so a broken interface
/// is a link error even where the validator would also reject the stage.
pub(crate) fn link(vertex: VertexSource<'_>, fragment: FragmentSource<'_>) -> Result<LinkedStages> {
    let (vertex, fragment) = (vertex.0, fragment.0);

    let vertex_entry = EntryRef::find(&vertex)?;
    let fragment_entry = EntryRef::find(&fragment)?;

    check_varyings(&vertex.module, &vertex_entry, &fragment.module, &fragment_entry)?;
    check_resources(&vertex.module, &fragment.module)?;

    vertex.validate()?;
    fragment.validate()?;

    Ok(LinkedStages {
        stages: [
            LinkedStage::new(vertex.module, vertex_entry),
            LinkedStage::new(fragment.module, fragment_entry),
        ],
    })
}

/// Index and name of the entry point a stage links through.
struct EntryRef(usize, String);

impl EntryRef {
    fn find(parsed: &ParsedStage<'_>) -> Result<Self> {
        let wanted = parsed.stage.naga();
        let mut entry_points = parsed
            .module
            .entry_points
            .iter()
            .enumerate()
            .filter(|(_, ep)| ep.stage == wanted);

        let Some((index, entry)) = entry_points.next() else {
            return Err(link_error(format!(
                "{} source has no @{} entry point",
                parsed.stage, parsed.stage
            )));
        };
        if entry_points.next().is_some() {
            log::debug!(
                "{} source has several @{} entry points; using `{}`",
                parsed.stage,
                parsed.stage,
                entry.name
            );
        }
        Ok(Self(index, entry.name.clone()))
    }

    fn function<'m>(&self, module: &'m Module) -> &'m naga::Function {
        &module.entry_points[self.0].function
    }
}

impl LinkedStage {
    fn new(module: Module, EntryRef(entry_index, entry_point): EntryRef) -> Self {
        let live_globals = reachable_globals(&module, &module.entry_points[entry_index].function);
        Self {
            module,
            entry_point,
            live_globals,
        }
    }
}

/// Globals referenced by `entry` or by any function it calls, transitively.
fn reachable_globals(module: &Module, entry: &naga::Function) -> HashSet<Handle<GlobalVariable>> {
    let mut live = HashSet::new();
    let mut visited = HashSet::new();
    let mut pending = Vec::new();

    collect_function(entry, &mut live, &mut pending);
    while let Some(handle) = pending.pop() {
        if visited.insert(handle) {
            collect_function(&module.functions[handle], &mut live, &mut pending);
        }
    }

    live
}

fn collect_function(
    function: &naga::Function,
    live: &mut HashSet<Handle<GlobalVariable>>,
    pending: &mut Vec<Handle<naga::Function>>,
) {
    live.extend(function.expressions.iter().filter_map(|(_, expr)| match expr {
        Expression::GlobalVariable(handle) => Some(*handle),
        _ => None,
    }));
    collect_calls(&function.body, pending);
}

fn collect_calls(block: &naga::Block, calls: &mut Vec<Handle<naga::Function>>) {
    for statement in block.iter() {
        match statement {
            Statement::Call { function, .. } => calls.push(*function),
            Statement::Block(inner) => collect_calls(inner, calls),
            Statement::If { accept, reject, .. } => {
                collect_calls(accept, calls);
                collect_calls(reject, calls);
            }
            Statement::Switch { cases, .. } => {
                for case in cases {
                    collect_calls(&case.body, calls);
                }
            }
            Statement::Loop { body, continuing, .. } => {
                collect_calls(body, calls);
                collect_calls(continuing, calls);
            }
            _ => {}
        }
    }
}

/// User-defined inter-stage value at `@location(n)`.
struct Varying {
    location: u32,
    ty: String,
}

#[derive(Default)]
struct StageIo {
    varyings: Vec<Varying>,
    writes_position: bool,
}

impl StageIo {
    fn collect(&mut self, module: &Module, ty: Handle<Type>, binding: Option<&Binding>) {
        match binding {
            Some(Binding::Location { location, .. }) => self.varyings.push(Varying {
                location: *location,
                ty: describe_type(module, ty),
            }),
            Some(Binding::BuiltIn(builtin)) => {
                if matches!(builtin, BuiltIn::Position { .. }) {
                    self.writes_position = true;
                }
            }
            None => {
                if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                    for member in members {
                        self.collect(module, member.ty, member.binding.as_ref());
                    }
                }
            }
        }
    }
}

fn check_varyings(
    vertex: &Module,
    vertex_entry: &EntryRef,
    fragment: &Module,
    fragment_entry: &EntryRef,
) -> Result<()> {
    let mut outputs = StageIo::default();
    if let Some(result) = &vertex_entry.function(vertex).result {
        outputs.collect(vertex, result.ty, result.binding.as_ref());
    }

    if !outputs.writes_position {
        return Err(link_error(format!(
            "vertex entry point `{}` does not write @builtin(position)",
            vertex_entry.1
        )));
    }

    let mut inputs = StageIo::default();
    for arg in &fragment_entry.function(fragment).arguments {
        inputs.collect(fragment, arg.ty, arg.binding.as_ref());
    }

    for input in &inputs.varyings {
        match outputs.varyings.iter().find(|o| o.location == input.location) {
            None => {
                return Err(link_error(format!(
                    "fragment input @location({}) {} has no matching vertex output",
                    input.location, input.ty
                )));
            }
            Some(output) if output.ty != input.ty => {
                return Err(link_error(format!(
                    "@location({}) is {} in the vertex stage but {} in the fragment stage",
                    input.location, output.ty, input.ty
                )));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

fn check_resources(vertex: &Module, fragment: &Module) -> Result<()> {
    for (_, v) in vertex.global_variables.iter() {
        let Some(vb) = &v.binding else { continue };

        let clash = fragment
            .global_variables
            .iter()
            .map(|(_, f)| f)
            .find(|f| f.binding.as_ref() == Some(vb));
        let Some(f) = clash else { continue };

        let (vt, ft) = (describe_type(vertex, v.ty), describe_type(fragment, f.ty));
        if v.space != f.space || vt != ft {
            return Err(link_error(format!(
                "@group({}) @binding({}) is `{}: {vt}` in the vertex stage but `{}: {ft}` in the fragment stage",
                vb.group,
                vb.binding,
                v.name.as_deref().unwrap_or("_"),
                f.name.as_deref().unwrap_or("_"),
            )));
        }
    }

    Ok(())
}

fn is_resource(space: AddressSpace) -> bool {
    matches!(
        space,
        AddressSpace::Uniform | AddressSpace::Handle | AddressSpace::Storage { .. }
    )
}

fn link_error(diagnostic: String) -> Error {
    Error::ProgramLink { diagnostic }
}

/// Renders a type in a module-independent form.
///
/// Type handles are arena indices, so types from two modules can only be
/// compared through a description like this one.
fn describe_type(module: &Module, ty: Handle<Type>) -> String {
    match &module.types[ty].inner {
        TypeInner::Scalar(scalar) => scalar_name(*scalar),
        TypeInner::Vector { size, scalar } => format!("vec{}<{}>", *size as u8, scalar_name(*scalar)),
        TypeInner::Matrix {
            columns,
            rows,
            scalar,
        } => format!("mat{}x{}<{}>", *columns as u8, *rows as u8, scalar_name(*scalar)),
        TypeInner::Array { base, size, stride } => {
            format!("array<{}, {size:?}, stride {stride}>", describe_type(module, *base))
        }
        TypeInner::Struct { members, span } => {
            let fields: Vec<String> = members
                .iter()
                .map(|m| {
                    format!(
                        "{}@{}: {}",
                        m.name.as_deref().unwrap_or("_"),
                        m.offset,
                        describe_type(module, m.ty)
                    )
                })
                .collect();
            format!("struct({span}) {{ {} }}", fields.join(", "))
        }
        other => format!("{other:?}"),
    }
}

fn scalar_name(scalar: naga::Scalar) -> String {
    use naga::ScalarKind;

    match (scalar.kind, scalar.width) {
        (ScalarKind::Float, 4) => "f32".into(),
        (ScalarKind::Float, 2) => "f16".into(),
        (ScalarKind::Sint, 4) => "i32".into(),
        (ScalarKind::Uint, 4) => "u32".into(),
        (ScalarKind::Bool, _) => "bool".into(),
        (kind, width) => format!("{kind:?}{}", u32::from(width) * 8),
    }
}
