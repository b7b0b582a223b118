use crate::oracle::ToolSchema;
use crate::tools::{CHECK_FILE_EXISTS, LIST_DIRECTORY, READ_FILE, WRITE_DOCKERFILE};
use serde_json::json;

/// The fixed operation schema offered to the oracle on every turn.
pub fn tool_schemas() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: LIST_DIRECTORY,
            description: "List files and subdirectories in the given path. Use '.' for project root.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Relative path from project root (use '.' for root)"
                    }
                },
                "required": ["path"]
            }),
        },
        ToolSchema {
            name: READ_FILE,
            description: "Read the contents of a file. Use for package.json, requirements.txt, go.mod, Cargo.toml, etc.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Relative path to the file"
                    },
                    "max_lines": {
                        "type": "integer",
                        "description": "Maximum lines to read (default 200)"
                    }
                },
                "required": ["path"]
            }),
        },
        ToolSchema {
            name: CHECK_FILE_EXISTS,
            description: "Check if a file or directory exists at the given path.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Relative path to check"
                    }
                },
                "required": ["path"]
            }),
        },
        ToolSchema {
            name: WRITE_DOCKERFILE,
            description: "Write the final Dockerfile to the project root. Call this when you have gathered enough information about the project.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "content": {
                        "type": "string",
                        "description": "Complete Dockerfile content"
                    }
                },
                "required": ["content"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_schema_is_an_object_with_required_fields() {
        for schema in tool_schemas() {
            assert_eq!(schema.parameters["type"], "object", "{}", schema.name);
            let required = schema.parameters["required"].as_array().unwrap();
            for field in required {
                let field = field.as_str().unwrap();
                assert!(
                    schema.parameters["properties"].get(field).is_some(),
                    "{} requires undeclared {field}",
                    schema.name
                );
            }
        }
    }

    #[test]
    fn names_are_unique() {
        let schemas = tool_schemas();
        let mut names: Vec<&str> = schemas.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), schemas.len());
    }
}
