// 异步流水线集成测试
//
// 测试流程：
// 1. tokio mpsc 通道作为异步生产者
// 2. 异步流水线与同步流水线结果一致
// 3. 生产者慢于消费者时顺序不变
// 4. 多源组合与同步组合结果一致

use qastream::async_seq::{self, from_iter, from_receiver, from_stream};
use qastream::{interleave, merge, seq, zip_with};
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_async_matches_sync_for_statistics() {
    let prices = vec![10.0, 10.5, 10.2, 10.8, 11.1, 10.9, 11.4, 11.0];

    let sync_ewma = seq(prices.clone()).ewma(0.3).unwrap().to_vec();
    let async_ewma = from_iter(prices.clone()).ewma(0.3).unwrap().to_vec().await;
    assert_eq!(sync_ewma, async_ewma);

    let sync_z = seq(prices.clone()).streaming_z_score().drop(2).to_vec();
    let async_z = from_iter(prices.clone())
        .streaming_z_score()
        .drop(2)
        .to_vec()
        .await;
    assert_eq!(sync_z, async_z);

    let pairs: Vec<(f64, f64)> = prices.iter().map(|p| (*p, p * 2.0 + 1.0)).collect();
    let correlations = from_iter(pairs).streaming_correlation().to_vec().await;
    assert_eq!(correlations.len(), prices.len() - 1);
    assert!(correlations.iter().all(|r| (r - 1.0).abs() < 1e-9));
}

#[tokio::test]
async fn test_slow_producer_preserves_order() {
    let (tx, rx) = mpsc::channel(1);
    let producer = tokio::spawn(async move {
        for i in 0..20u64 {
            tokio::time::sleep(Duration::from_millis(1)).await;
            if tx.send(i).await.is_err() {
                break;
            }
        }
    });

    let lows = from_receiver(rx).windowed_min(5).unwrap().to_vec().await;
    producer.await.unwrap();
    assert_eq!(lows, (0..16).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_take_releases_producer() {
    let (tx, rx) = mpsc::channel(2);
    let producer = tokio::spawn(async move {
        let mut sent = 0;
        while tx.send(sent).await.is_ok() {
            sent += 1;
        }
        sent
    });

    let head = from_receiver(rx).take(3).to_vec().await;
    assert_eq!(head, vec![0, 1, 2]);
    // 接收端被丢弃后发送失败，生产者退出
    let sent = producer.await.unwrap();
    assert!(sent >= 3);
}

#[tokio::test]
async fn test_from_stream_with_sort_and_chunk() {
    let source = futures::stream::iter(vec![5, 1, 4, 2, 3]);
    let chunks = from_stream(source)
        .sort()
        .chunk(2)
        .unwrap()
        .to_vec()
        .await;
    assert_eq!(chunks, vec![vec![1, 2], vec![3, 4], vec![5]]);
}

#[tokio::test]
async fn test_async_order_statistics_via_collect_seq() {
    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(async move {
        for v in [4.0, 1.0, 3.0, 2.0] {
            let _ = tx.send(v).await;
        }
    });

    let quartiles = from_receiver(rx).collect_seq().await.quartiles();
    assert_eq!(quartiles, Some((1.75, 2.5, 3.25)));
}

#[tokio::test]
async fn test_async_combinators_match_sync() {
    let bids = vec![vec![1, 4, 9], vec![2, 3, 10], vec![5]];

    let sync_merged = merge(bids.clone()).to_vec();
    let async_merged = async_seq::merge(bids.clone().into_iter().map(from_iter))
        .to_vec()
        .await;
    assert_eq!(async_merged, sync_merged);
    assert_eq!(async_merged, vec![1, 2, 3, 4, 5, 9, 10]);

    let sync_mixed = interleave(bids.clone()).to_vec();
    let async_mixed = async_seq::interleave(bids.into_iter().map(from_iter))
        .to_vec()
        .await;
    assert_eq!(async_mixed, sync_mixed);

    let spreads = async_seq::zip_with(
        from_iter(vec![10.5, 10.6, 10.7]),
        from_iter(vec![10.4, 10.4]),
        |ask, bid| ask - bid,
    )
    .to_vec()
    .await;
    let expected = zip_with(vec![10.5, 10.6, 10.7], vec![10.4, 10.4], |ask, bid| ask - bid).to_vec();
    assert_eq!(spreads, expected);
}

#[tokio::test]
async fn test_async_merge_of_slow_producers() {
    let mut receivers = Vec::new();
    let mut producers = Vec::new();
    for offset in 0..3u64 {
        let (tx, rx) = mpsc::channel(1);
        receivers.push(from_receiver(rx));
        producers.push(tokio::spawn(async move {
            for i in 0..4u64 {
                tokio::time::sleep(Duration::from_millis(1 + offset)).await;
                if tx.send(i * 3 + offset).await.is_err() {
                    break;
                }
            }
        }));
    }

    let merged = async_seq::merge(receivers).to_vec().await;
    for producer in producers {
        producer.await.unwrap();
    }
    assert_eq!(merged, (0..12).collect::<Vec<u64>>());
}
