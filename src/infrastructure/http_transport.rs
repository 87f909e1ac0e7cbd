//! HTTP 传输 - 基础设施层
//!
//! 基于 reqwest 的 `Transport` 实现：
//! - 请求体分块流式上传，每发出一块上报一次进度
//! - 收到任何 HTTP 响应都视为完成，由上层解释响应内容
//! - 连接失败、读取响应失败视为传输错误
//! - `abort` 直接取消后台任务

use futures::stream;
use reqwest::header::CONTENT_LENGTH;
use reqwest::Body;
use tokio::task::JoinHandle;
use tracing::debug;

use super::transport::{SubmissionRequest, Transport, TransportHandle, TransportReactions};
use crate::config::Config;
use crate::error::AppResult;

/// reqwest 传输
pub struct ReqwestTransport {
    client: reqwest::Client,
    chunk_size: usize,
}

impl ReqwestTransport {
    /// 创建新的 HTTP 传输
    ///
    /// 只设置连接超时：上传本身不设总超时，耗时过长时由上层给出提示。
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            client,
            chunk_size: config.upload_chunk_size.max(1),
        })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: SubmissionRequest, reactions: TransportReactions) -> Box<dyn TransportHandle> {
        let client = self.client.clone();
        let chunk_size = self.chunk_size;
        let task = tokio::spawn(execute(client, request, chunk_size, reactions));
        Box::new(ReqwestHandle { task: Some(task) })
    }
}

/// 在途请求句柄
struct ReqwestHandle {
    task: Option<JoinHandle<()>>,
}

impl TransportHandle for ReqwestHandle {
    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                debug!("中止在途的上传请求");
            }
            task.abort();
        }
    }
}

async fn execute(
    client: reqwest::Client,
    request: SubmissionRequest,
    chunk_size: usize,
    reactions: TransportReactions,
) {
    let SubmissionRequest { url, headers, body } = request;
    let total = body.len() as u64;
    let reporter = reactions.progress_reporter();

    let chunks: Vec<Vec<u8>> = body.chunks(chunk_size).map(<[u8]>::to_vec).collect();
    let mut loaded = 0u64;
    let upload = stream::iter(chunks.into_iter().map(move |chunk| {
        loaded += chunk.len() as u64;
        reporter.report(loaded, total);
        Ok::<Vec<u8>, std::io::Error>(chunk)
    }));

    let mut builder = client.post(&url).header(CONTENT_LENGTH, total);
    for (name, value) in &headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    debug!("POST {} ({} 字节)", url, total);

    let response = match builder.body(Body::wrap_stream(upload)).send().await {
        Ok(response) => response,
        Err(e) => {
            reactions.fail(format!("Network request failed, cancelling. ({e})"));
            return;
        }
    };

    let status = response.status().as_u16();
    match response.bytes().await {
        Ok(bytes) => reactions.complete(bytes.to_vec(), status),
        Err(e) => reactions.fail(format!("Failed to read API response, cancelling. ({e})")),
    }
}
