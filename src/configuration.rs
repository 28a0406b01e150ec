pub trait Configuration: Clone + Send + Sync + 'static {
    fn website_title(&self) -> String;
    fn port(&self) -> u16;
    fn database_url(&self) -> Option<String>;
}
