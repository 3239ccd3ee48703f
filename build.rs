extern crate glsl_to_spirv;

use glsl_to_spirv::ShaderType;
use std::error::Error;
use std::io::Read;

const GLSL_DIR: &str = "res/shaders/glsl";
const SPIRV_DIR: &str = "res/shaders/spirv";

fn main() -> Result<(), Box<dyn Error>> {
    // Change detection of source shaders
    println!("cargo:rerun-if-changed={GLSL_DIR}");

    std::fs::create_dir_all(SPIRV_DIR)?;

    // Compile each shader at source
    for entry in std::fs::read_dir(GLSL_DIR)? {
        let entry = entry?;

        if !entry.file_type()?.is_file() {
            continue;
        }

        let in_path = entry.path();

        // Match shader file extension
        let Some(shader_type) =
            in_path
                .extension()
                .and_then(|ext| match ext.to_string_lossy().as_ref() {
                    "vert" => Some(ShaderType::Vertex),
                    "frag" => Some(ShaderType::Fragment),
                    _ => None,
                })
        else {
            continue;
        };

        let Some(file_name) = in_path.file_name() else {
            continue;
        };

        println!("cargo:rerun-if-changed={}", in_path.display());

        let source = std::fs::read_to_string(&in_path)?;

        let mut compiled_file = glsl_to_spirv::compile(&source, shader_type)
            .map_err(|err| format!("{}: {err}", in_path.display()))?;

        let mut compiled_bytes = Vec::new();
        compiled_file.read_to_end(&mut compiled_bytes)?;

        let out_path = format!("{SPIRV_DIR}/{}.spv", file_name.to_string_lossy());

        std::fs::write(&out_path, &compiled_bytes)?;
    }

    Ok(())
}
