//! Flask stack for Python

use super::*;

pub struct FlaskTemplate;

impl StackTemplate for FlaskTemplate {
    fn stack(&self) -> Stack {
        Stack::Flask
    }

    fn display_name(&self) -> &'static str {
        "Flask"
    }

    fn base_image(&self) -> &'static str {
        "python"
    }

    fn default_port(&self) -> u16 {
        5000
    }

    fn dependency_manifest(&self) -> &'static str {
        "requirements.txt"
    }

    fn install_block(&self) -> Vec<Directive> {
        vec![
            Directive::copy(["requirements.txt"], "/app/"),
            Directive::Run("pip install -r requirements.txt".to_string()),
        ]
    }

    fn source_copy(&self) -> Directive {
        Directive::copy(["."], "/app/")
    }

    fn start_command(&self, _port: u16) -> Vec<String> {
        vec!["python".to_string(), "app.py".to_string()]
    }
}
