//! Column configuration for the lead data set.
//!
//! The field set is fixed and known in advance; only the `visible` flag is
//! ever mutated, toggled interactively from the column panel.

pub const ID_INSTA: &str = "ID_Insta";
pub const CONTA_INSTA: &str = "Conta_Insta";
pub const NOME: &str = "Nome";
pub const ESPECIALIDADES: &str = "Especialidades";
pub const CIDADE_ESTADO: &str = "Cidade_Estado";
pub const TELEFONE: &str = "Telefone";
pub const TELEFONES_BIO: &str = "Telefones_Bio";
pub const EMAIL: &str = "e-mail";
pub const EMAIL_BIO: &str = "Email_Bio";
pub const ENDERECO: &str = "Endereco";
pub const TEM_WHATSAPP: &str = "Tem_WhatsApp";
pub const BIO: &str = "Bio";
pub const LINK_BIO: &str = "Link-Bio";
pub const LOCAL: &str = "Local";
pub const IDIOMA: &str = "Idioma";

// The literal value marking a lead as reachable via WhatsApp.
pub const WHATSAPP_YES: &str = "Sim";

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub visible: bool,
    // Display width hint for the exported worksheet, in characters.
    pub width: u16,
}

/// The ordered column configuration. Order here is the column order used for
/// card details and for every export.
pub fn lead_fields() -> Vec<FieldDescriptor> {
    vec![
        field(ID_INSTA, "ID Instagram", false, 14),
        field(CONTA_INSTA, "Conta Instagram", true, 20),
        field(NOME, "Nome", true, 28),
        field(ESPECIALIDADES, "Especialidades", true, 30),
        field(CIDADE_ESTADO, "Cidade/Estado", true, 22),
        field(TELEFONE, "Telefone Principal", true, 18),
        field(TELEFONES_BIO, "Telefones (Bio)", true, 24),
        field(EMAIL, "E-mail Principal", false, 28),
        field(EMAIL_BIO, "Email (Bio)", true, 28),
        field(ENDERECO, "Endereço", true, 36),
        field(TEM_WHATSAPP, "WhatsApp", true, 10),
        field(BIO, "Bio Original", true, 50),
        field(LINK_BIO, "Link Bio", false, 30),
        field(LOCAL, "Local", false, 16),
        field(IDIOMA, "Idioma", false, 10),
    ]
}

fn field(key: &'static str, label: &'static str, visible: bool, width: u16) -> FieldDescriptor {
    FieldDescriptor {
        key,
        label,
        visible,
        width,
    }
}

pub fn is_phone_field(key: &str) -> bool {
    key == TELEFONE || key == TELEFONES_BIO
}
