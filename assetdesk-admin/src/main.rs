mod api;
use assetdesk_common::version::assetdesk_version;
use poem_openapi::OpenApiService;
use regex::Regex;

#[allow(clippy::unwrap_used)]
pub fn main() {
    let api_service = OpenApiService::new(api::get(), "Assetdesk Admin", assetdesk_version())
        .server("/api");

    let spec = api_service.spec();
    let re = Regex::new(r"PaginatedResponse<(?P<name>\w+)>").unwrap();
    let spec = re.replace_all(&spec, "Paginated$name");

    println!("{spec}");
}
