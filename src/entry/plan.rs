use std::sync::Arc;
use std::time::Duration;

use tracing::error;
use url::Url;

use loadburst::args::{OutputFormat, TesterArgs};
use loadburst::error::{AppError, AppResult, ValidationError};
use loadburst::http::HttpExecutorFactory;
use loadburst::load::{LoadTestConfig, LoadTestRunner, LogProgress, ProgressSink, RequestSpec};

/// Everything a local run needs once arguments and config are merged.
pub(crate) struct RunPlan {
    config: LoadTestConfig,
    request_timeout: Duration,
    output_format: OutputFormat,
}

pub(crate) fn build_plan(args: TesterArgs) -> AppResult<RunPlan> {
    let Some(url) = args.url else {
        error!("Missing URL (set --url or provide in config).");
        return Err(AppError::validation(ValidationError::MissingUrl));
    };
    let parsed = Url::parse(&url).map_err(|err| {
        AppError::validation(ValidationError::InvalidUrl {
            url: url.clone(),
            source: err,
        })
    })?;
    if parsed.host_str().is_none() {
        return Err(AppError::validation(ValidationError::UrlMissingHost));
    }

    Ok(RunPlan {
        config: LoadTestConfig {
            request: RequestSpec {
                method: args.method,
                url,
                headers: args.headers,
                body: args.data,
            },
            concurrent_users: args.users,
            requests_per_user: args.requests_per_user,
            ramp_up_secs: args.ramp_up_secs,
            test_duration_secs: args.duration_secs,
        },
        request_timeout: args.request_timeout,
        output_format: args.output_format,
    })
}

pub(crate) async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    let factory = HttpExecutorFactory::new(&plan.config.request, plan.request_timeout);
    let progress: Arc<dyn ProgressSink> = Arc::new(LogProgress);

    let result = LoadTestRunner::new()
        .run(&plan.config, progress, &factory)
        .await;

    match plan.output_format {
        OutputFormat::Text => print!("{}", result.metrics.generate_report()),
        OutputFormat::Json => println!("{}", result.metrics.summary().to_json()?),
    }

    if result.completed {
        return Ok(());
    }
    Err(AppError::validation(ValidationError::RunIncomplete {
        reason: result.error_message.unwrap_or_default(),
    }))
}
