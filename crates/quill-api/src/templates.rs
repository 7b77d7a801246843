use minijinja::{Environment, Value, default_auto_escape_callback};

/// Every page, compiled into the binary.
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("templates/base.html")),
    ("auth/register.html", include_str!("templates/auth/register.html")),
    ("auth/login.html", include_str!("templates/auth/login.html")),
    ("blog/index.html", include_str!("templates/blog/index.html")),
    ("blog/create.html", include_str!("templates/blog/create.html")),
    ("blog/update.html", include_str!("templates/blog/update.html")),
    ("error.html", include_str!("templates/error.html")),
];

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        env.add_filter("date", date);
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error> {
        self.env.get_template(template_name)?.render(context)
    }
}

/// `2018-01-01T00:00:00` -> `2018-01-01`
fn date(value: String) -> String {
    match value.split_once(|c: char| c == 'T' || c == ' ') {
        Some((day, _)) => day.to_string(),
        None => value,
    }
}
