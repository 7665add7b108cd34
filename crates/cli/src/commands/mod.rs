pub(crate) mod capture;
pub(crate) mod chat;
pub(crate) mod history;
pub(crate) mod records;
pub(crate) mod remind;
pub(crate) mod settings;
