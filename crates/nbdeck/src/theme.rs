use eframe::egui::Color32;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    pub muted: Color32,
    pub code_background: Color32,
    pub code_foreground: Color32,
    pub output_foreground: Color32,
    pub error_foreground: Color32,
    pub h1_size: f32,
    pub h2_size: f32,
    pub h3_size: f32,
    pub body_size: f32,
    pub code_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x11, 0x11, 0x11),
            foreground: Color32::from_rgb(0xDD, 0xDD, 0xDD),
            heading_color: Color32::from_rgb(0xF2, 0xF2, 0xF2),
            accent: Color32::from_rgb(0x42, 0xA5, 0xF5),
            muted: Color32::from_rgb(0x80, 0x80, 0x80),
            code_background: Color32::from_rgb(0x21, 0x21, 0x21),
            code_foreground: Color32::from_rgb(0xE0, 0xE0, 0xE0),
            output_foreground: Color32::from_rgb(0xB0, 0xB0, 0xB0),
            error_foreground: Color32::from_rgb(0xF4, 0x6C, 0x6C),
            h1_size: 40.0,
            h2_size: 32.0,
            h3_size: 26.0,
            body_size: 20.0,
            code_size: 16.0,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::WHITE,
            foreground: Color32::from_rgb(0x21, 0x21, 0x21),
            heading_color: Color32::from_rgb(0x10, 0x10, 0x10),
            accent: Color32::from_rgb(0x19, 0x76, 0xD2),
            muted: Color32::from_rgb(0x8A, 0x8A, 0x99),
            code_background: Color32::from_rgb(0xF7, 0xF7, 0xF7),
            code_foreground: Color32::from_rgb(0x21, 0x21, 0x21),
            output_foreground: Color32::from_rgb(0x44, 0x44, 0x55),
            error_foreground: Color32::from_rgb(0xB0, 0x20, 0x20),
            h1_size: 40.0,
            h2_size: 32.0,
            h3_size: 26.0,
            body_size: 20.0,
            code_size: 16.0,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            _ => Self::light(),
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Scale a colour's alpha by `opacity`.
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        let alpha = (opacity.clamp(0.0, 1.0) * color.a() as f32) as u8;
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
    }

    pub fn heading_size(&self, level: usize) -> f32 {
        match level {
            1 => self.h1_size,
            2 => self.h2_size,
            3 => self.h3_size,
            _ => self.body_size,
        }
    }

    /// Bundled syntect theme for code cells.
    pub fn syntect_theme_name(&self) -> &str {
        if self.name == "dark" {
            "base16-ocean.dark"
        } else {
            "InspiredGitHub"
        }
    }
}
