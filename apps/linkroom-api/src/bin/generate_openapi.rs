use std::path::Path;
use std::process::ExitCode;

use utoipa::OpenApi;

fn main() -> ExitCode {
    let spec = match linkroom_api::routes::ApiDoc::openapi().to_pretty_json() {
        Ok(spec) => spec,
        Err(err) => {
            eprintln!("failed to render OpenAPI document: {err}");
            return ExitCode::FAILURE;
        }
    };

    let out = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../specs/linkroom-api.json");
    if let Some(parent) = out.parent() {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("failed to create {}: {err}", parent.display());
            return ExitCode::FAILURE;
        }
    }
    if let Err(err) = std::fs::write(&out, spec) {
        eprintln!("failed to write {}: {err}", out.display());
        return ExitCode::FAILURE;
    }

    println!("Wrote {}", out.display());
    ExitCode::SUCCESS
}
