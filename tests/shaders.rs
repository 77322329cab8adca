//! The WGSL sources are parsed and validated with naga so a broken shader
//! fails here instead of at pipeline creation.

fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
    let module = naga::front::wgsl::parse_str(code)
        .map_err(|e| format!("WGSL parse error: {:?}", e))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error: {:?}", e))?;

    Ok(module)
}

fn entry_points(module: &naga::Module) -> Vec<(&str, naga::ShaderStage)> {
    module
        .entry_points
        .iter()
        .map(|ep| (ep.name.as_str(), ep.stage))
        .collect()
}

#[test]
fn physics_shader_is_valid() {
    let module = validate_wgsl(include_str!("../src/physics.wgsl")).unwrap();
    assert_eq!(
        entry_points(&module),
        [("main", naga::ShaderStage::Compute)]
    );
}

#[test]
fn point_shader_is_valid() {
    let module = validate_wgsl(include_str!("../src/render.wgsl")).unwrap();
    let entries = entry_points(&module);
    assert!(entries.contains(&("vertex", naga::ShaderStage::Vertex)));
    assert!(entries.contains(&("fragment", naga::ShaderStage::Fragment)));
}

#[test]
fn field_shader_is_valid() {
    let module = validate_wgsl(include_str!("../src/field.wgsl")).unwrap();
    let entries = entry_points(&module);
    assert!(entries.contains(&("vertex", naga::ShaderStage::Vertex)));
    assert!(entries.contains(&("fragment", naga::ShaderStage::Fragment)));
}

#[test]
fn uniform_blocks_match_host_structs() {
    use attractor_field::{physics::PhysicsParams, render::Globals};

    for (source, name, host_size) in [
        (
            include_str!("../src/physics.wgsl"),
            "Params",
            std::mem::size_of::<PhysicsParams>(),
        ),
        (
            include_str!("../src/field.wgsl"),
            "Globals",
            std::mem::size_of::<Globals>(),
        ),
        (
            include_str!("../src/render.wgsl"),
            "Globals",
            std::mem::size_of::<Globals>(),
        ),
    ] {
        let module = validate_wgsl(source).unwrap();
        let ty = module
            .types
            .iter()
            .find(|(_, ty)| ty.name.as_deref() == Some(name))
            .map(|(_, ty)| &ty.inner)
            .unwrap();

        let naga::TypeInner::Struct { span, .. } = ty else {
            panic!("{name} is not a struct");
        };
        assert_eq!(*span as usize, host_size, "{name}");
    }
}
