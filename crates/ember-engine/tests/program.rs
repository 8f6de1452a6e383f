mod common;

use common::{shipped_shaders, Headless, FORMAT};
use ember_engine::render::{ProgramTargets, ShaderProgram, ShaderStage, UniformLocation, DEPTH_FORMAT};
use ember_engine::Error;

const PLAIN_VERTEX: &str = r#"
@vertex
fn vs_main(@builtin(vertex_index) i: u32) -> @builtin(position) vec4<f32> {
    let x = f32(i32(i) - 1);
    return vec4<f32>(x, 0.0, 0.0, 1.0);
}
"#;

const TINTED_FRAGMENT: &str = r#"
struct Tint {
    color: vec4<f32>,
}

@group(0) @binding(0) var<uniform> tint: Tint;
@group(0) @binding(1) var<uniform> unused: Tint;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return tint.color;
}
"#;

#[test]
fn shipped_programs_link() {
    let Some(gpu) = Headless::new() else { return };
    let shaders = shipped_shaders();

    let scene = ShaderProgram::create(
        &gpu.device,
        "scene",
        &shaders.scene.vertex,
        &shaders.scene.fragment,
        ProgramTargets::color(FORMAT).with_depth(DEPTH_FORMAT),
    )
    .unwrap();
    assert_eq!(scene.label(), "scene");

    let blit = ShaderProgram::create(
        &gpu.device,
        "blit",
        &shaders.blit.vertex,
        &shaders.blit.fragment,
        ProgramTargets::color(FORMAT),
    )
    .unwrap();
    assert_eq!(
        blit.uniform_location("source_texture"),
        Some(UniformLocation { group: 0, binding: 0 })
    );
    assert_eq!(
        blit.uniform_location("source_sampler"),
        Some(UniformLocation { group: 0, binding: 1 })
    );
}

#[test]
fn malformed_fragment_fails_to_compile() {
    let Some(gpu) = Headless::new() else { return };
    let shaders = shipped_shaders();

    let broken = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0 }";
    let err = ShaderProgram::create(
        &gpu.device,
        "broken",
        &shaders.blit.vertex,
        broken,
        ProgramTargets::color(FORMAT),
    )
    .unwrap_err();

    match err {
        Error::ShaderCompile { stage, diagnostic } => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(!diagnostic.is_empty());
        }
        other => panic!("expected a fragment compile error, got {other:?}"),
    }
}

#[test]
fn mismatched_stages_fail_to_link() {
    let Some(gpu) = Headless::new() else { return };
    let shaders = shipped_shaders();

    // The plain vertex stage writes no varyings; the scene fragment reads one at location 0.
    let err = ShaderProgram::create(
        &gpu.device,
        "mismatched",
        PLAIN_VERTEX,
        &shaders.scene.fragment,
        ProgramTargets::color(FORMAT),
    )
    .unwrap_err();

    assert!(matches!(err, Error::ProgramLink { .. }), "{err:?}");
}

#[test]
fn uniform_lookups_are_cached() {
    let Some(gpu) = Headless::new() else { return };

    let program = ShaderProgram::create(
        &gpu.device,
        "tinted",
        PLAIN_VERTEX,
        TINTED_FRAGMENT,
        ProgramTargets::color(FORMAT),
    )
    .unwrap();
    assert_eq!(program.cached_uniform_count(), 0);

    let first = program.uniform_location("tint");
    let second = program.uniform_location("tint");
    assert_eq!(first, Some(UniformLocation { group: 0, binding: 0 }));
    assert_eq!(first, second);
    assert_eq!(program.cached_uniform_count(), 1);

    // Declared but never read: not part of the program.
    assert_eq!(program.uniform_location("unused"), None);
    assert_eq!(program.uniform_location("missing"), None);
    assert_eq!(program.cached_uniform_count(), 3);
}

#[test]
fn bind_groups_skip_unknown_names() {
    let Some(gpu) = Headless::new() else { return };

    let program = ShaderProgram::create(
        &gpu.device,
        "tinted",
        PLAIN_VERTEX,
        TINTED_FRAGMENT,
        ProgramTargets::color(FORMAT),
    )
    .unwrap();

    let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("tint"),
        size: 16,
        usage: wgpu::BufferUsages::UNIFORM,
        mapped_at_creation: false,
    });

    let groups = program.bind_groups(
        &gpu.device,
        "tinted bind group",
        [
            ("tint", buffer.as_entire_binding()),
            ("not_in_shader", buffer.as_entire_binding()),
        ],
    );
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].group, 0);

    program.destroy();
}

#[test]
fn resources_of_uncalled_helpers_are_not_bound() {
    let Some(gpu) = Headless::new() else { return };

    let fragment = r#"
@group(1) @binding(0) var<uniform> stale: vec4<f32>;

fn never_called() -> vec4<f32> {
    return stale;
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
    let program = ShaderProgram::create(
        &gpu.device,
        "helper",
        PLAIN_VERTEX,
        fragment,
        ProgramTargets::color(FORMAT),
    )
    .unwrap();
    assert_eq!(program.uniform_location("stale"), None);

    let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("stale"),
        size: 16,
        usage: wgpu::BufferUsages::UNIFORM,
        mapped_at_creation: false,
    });
    let groups = program.bind_groups(&gpu.device, "helper bind group", [("stale", buffer.as_entire_binding())]);
    assert!(groups.is_empty());
}
