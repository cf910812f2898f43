use serde::Serialize;

/// Palette derived from a template's gradient stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub name: &'static str,
    pub gradient: String,
    pub text: &'static str,
    pub border: &'static str,
    pub border_dark: &'static str,
    pub bg: &'static str,
    pub bullet: &'static str,
    pub link: &'static str,
    pub accent: &'static str,
    pub dot: &'static str,
}

impl Theme {
    pub fn from_theme_color(theme_color: &str) -> Self {
        let gradient = theme_color.to_string();
        if theme_color.contains("blue") {
            Theme {
                name: "blue",
                gradient,
                text: "text-blue-900",
                border: "border-blue-200",
                border_dark: "border-blue-300",
                bg: "bg-blue-50",
                bullet: "bg-blue-400",
                link: "text-blue-600 decoration-blue-300",
                accent: "text-blue-600",
                dot: "#93c5fd",
            }
        } else if theme_color.contains("emerald") {
            Theme {
                name: "emerald",
                gradient,
                text: "text-emerald-900",
                border: "border-emerald-200",
                border_dark: "border-emerald-300",
                bg: "bg-emerald-50",
                bullet: "bg-emerald-400",
                link: "text-emerald-600 decoration-emerald-300",
                accent: "text-emerald-600",
                dot: "#6ee7b7",
            }
        } else {
            Theme {
                name: "indigo",
                gradient,
                text: "text-indigo-900",
                border: "border-indigo-200",
                border_dark: "border-indigo-300",
                bg: "bg-indigo-50",
                bullet: "bg-indigo-400",
                link: "text-indigo-600 decoration-indigo-300",
                accent: "text-indigo-600",
                dot: "#a5b4fc",
            }
        }
    }
}
