//! Django stack for Python

use super::*;

pub struct DjangoTemplate;

impl StackTemplate for DjangoTemplate {
    fn stack(&self) -> Stack {
        Stack::Django
    }

    fn display_name(&self) -> &'static str {
        "Django"
    }

    fn base_image(&self) -> &'static str {
        "python"
    }

    fn default_port(&self) -> u16 {
        8000
    }

    fn dependency_manifest(&self) -> &'static str {
        "requirements.txt"
    }

    fn environment(&self) -> Vec<(&'static str, &'static str)> {
        vec![("PYTHONDONTWRITEBYTECODE", "1"), ("PYTHONUNBUFFERED", "1")]
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

    /// The dev server binds all interfaces so the published port reaches it
    fn start_command(&self, port: u16) -> Vec<String> {
        vec![
            "python".to_string(),
            "manage.py".to_string(),
            "runserver".to_string(),
            format!("0.0.0.0:{}", port),
        ]
    }
}
