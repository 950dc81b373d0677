mod entry;
mod logger;

use loadburst::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
