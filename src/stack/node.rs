//! Node.js stack

use super::*;

pub struct NodeTemplate;

impl StackTemplate for NodeTemplate {
    fn stack(&self) -> Stack {
        Stack::Node
    }

    fn display_name(&self) -> &'static str {
        "Node.js"
    }

    fn base_image(&self) -> &'static str {
        "node"
    }

    fn default_port(&self) -> u16 {
        3000
    }

    fn dependency_manifest(&self) -> &'static str {
        "package.json"
    }

    fn install_block(&self) -> Vec<Directive> {
        vec![
            Directive::copy(["package*.json"], "./"),
            Directive::Run("npm install".to_string()),
        ]
    }

    fn source_copy(&self) -> Directive {
        Directive::copy(["."], ".")
    }

    fn start_command(&self, _port: u16) -> Vec<String> {
        vec!["npm".to_string(), "start".to_string()]
    }
}
